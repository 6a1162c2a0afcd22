//! 连接生命周期事件目录：封闭的事件种类集合及其载荷形状。
//! The connection lifecycle event catalog: the closed set of event kinds and
//! the payload shape each carries.
//!
//! Pure data definitions with no side effects. Every event corresponds to
//! exactly one transition of exactly one endpoint's state machine and is never
//! reused after delivery.
//!
//! 纯数据定义，无副作用。每个事件恰好对应一个端点状态机的一次转换，
//! 送达后不再复用。

/// An OS-level handle identifier associated with an I/O-bearing transition.
/// 与I/O相关转换关联的操作系统级句柄标识。
pub type Descriptor = i32;

/// The kind of a lifecycle event.
///
/// The set is closed: payload schemas are fixed per kind at compile time, and
/// exhaustive matches make an unknown kind unrepresentable.
///
/// 生命周期事件的种类。
///
/// 集合是封闭的：每个种类的载荷模式在编译期固定，
/// 穷举匹配使未知种类不可表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A listener endpoint was successfully bound.
    /// 监听端点成功绑定。
    Listening,
    /// The listener accepted an incoming peer connection.
    /// 监听器接受了一个传入的对端连接。
    Accepted,
    /// A connector endpoint established its connection.
    /// 连接端点建立了连接。
    Connected,
    /// A connection attempt failed and will be retried.
    /// 一次连接尝试失败，将会重试。
    ConnectDelayed,
    /// The endpoint was closed by an explicit local action.
    /// 端点因显式的本地操作而关闭。
    Closed,
    /// An attempt to close the endpoint failed.
    /// 关闭端点的尝试失败。
    CloseFailed,
    /// The transport connection was severed by the peer or the transport.
    /// 传输连接被对端或传输层切断。
    Disconnected,
}

/// One lifecycle event occurrence, immutable once emitted.
///
/// A tagged union with per-variant fields: listener/connection kinds carry the
/// descriptor valid at the instant of the transition, failure kinds carry a
/// nonzero OS error code. Every variant carries the endpoint address exactly
/// as it was configured at bind/connect time.
///
/// 一次生命周期事件，发出后不可变。
///
/// 带逐变体字段的标签联合：监听/连接类种类携带转换瞬间有效的描述符，
/// 失败类种类携带非零的操作系统错误码。每个变体都携带与
/// bind/connect时配置完全一致的端点地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Emitted once when a listener endpoint is bound.
    /// 监听端点绑定时发出一次。
    Listening { endpoint: String, fd: Descriptor },
    /// Emitted once per accepted peer; the listener itself keeps listening.
    /// 每接受一个对端发出一次；监听器本身继续监听。
    Accepted { endpoint: String, fd: Descriptor },
    /// Emitted once when a connector's connection attempt succeeds.
    /// 连接器的连接尝试成功时发出一次。
    Connected { endpoint: String, fd: Descriptor },
    /// Emitted for every failed connection attempt; non-terminal.
    /// 每次连接尝试失败都会发出；非终态。
    ConnectDelayed { endpoint: String, err: i32 },
    /// Terminal: the endpoint was explicitly closed locally.
    /// 终态：端点已在本地被显式关闭。
    Closed { endpoint: String, fd: Descriptor },
    /// Advisory: closing the endpoint failed; the resource may be retried or
    /// leaked at the transport layer.
    /// 告知性：关闭端点失败；资源可能在传输层被重试或泄漏。
    CloseFailed { endpoint: String, err: i32 },
    /// Terminal: the connection was severed by the peer or the transport.
    /// 终态：连接被对端或传输层切断。
    Disconnected { endpoint: String, fd: Descriptor },
}

impl SocketEvent {
    /// Returns the kind tag of this event.
    /// 返回此事件的种类标签。
    pub fn kind(&self) -> EventKind {
        match self {
            SocketEvent::Listening { .. } => EventKind::Listening,
            SocketEvent::Accepted { .. } => EventKind::Accepted,
            SocketEvent::Connected { .. } => EventKind::Connected,
            SocketEvent::ConnectDelayed { .. } => EventKind::ConnectDelayed,
            SocketEvent::Closed { .. } => EventKind::Closed,
            SocketEvent::CloseFailed { .. } => EventKind::CloseFailed,
            SocketEvent::Disconnected { .. } => EventKind::Disconnected,
        }
    }

    /// The endpoint address string, verbatim as configured at bind/connect time.
    /// 端点地址字符串，与bind/connect时配置的完全一致。
    pub fn endpoint(&self) -> &str {
        match self {
            SocketEvent::Listening { endpoint, .. }
            | SocketEvent::Accepted { endpoint, .. }
            | SocketEvent::Connected { endpoint, .. }
            | SocketEvent::ConnectDelayed { endpoint, .. }
            | SocketEvent::Closed { endpoint, .. }
            | SocketEvent::CloseFailed { endpoint, .. }
            | SocketEvent::Disconnected { endpoint, .. } => endpoint,
        }
    }

    /// The OS handle for I/O-bearing kinds; `None` for failure kinds.
    /// I/O相关种类的操作系统句柄；失败类种类为 `None`。
    pub fn descriptor(&self) -> Option<Descriptor> {
        match self {
            SocketEvent::Listening { fd, .. }
            | SocketEvent::Accepted { fd, .. }
            | SocketEvent::Connected { fd, .. }
            | SocketEvent::Closed { fd, .. }
            | SocketEvent::Disconnected { fd, .. } => Some(*fd),
            SocketEvent::ConnectDelayed { .. } | SocketEvent::CloseFailed { .. } => None,
        }
    }

    /// The nonzero OS error code for failure kinds; `None` otherwise.
    /// 失败类种类的非零操作系统错误码；其他情况为 `None`。
    pub fn error_code(&self) -> Option<i32> {
        match self {
            SocketEvent::ConnectDelayed { err, .. } | SocketEvent::CloseFailed { err, .. } => {
                Some(*err)
            }
            SocketEvent::Listening { .. }
            | SocketEvent::Accepted { .. }
            | SocketEvent::Connected { .. }
            | SocketEvent::Closed { .. }
            | SocketEvent::Disconnected { .. } => None,
        }
    }
}
