//! 连接状态跟踪器 - 每个传输端点一个实例的生命周期状态机。
//! Connection State Tracker - One lifecycle state machine per transport endpoint.
//!
//! A tracker is owned exclusively by the task driving its endpoint and is
//! never shared, so its state needs no locking. Each recognized transition
//! emits exactly one event synchronously through the dispatcher; trackers
//! never skip, duplicate, or reorder their own transitions.
//!
//! 跟踪器由驱动其端点的任务独占拥有，从不共享，因此其状态无需加锁。
//! 每个被识别的转换通过分发器同步地恰好发出一个事件；跟踪器从不
//! 跳过、重复或重排自己的转换。

use super::{dispatcher::EventDispatcher, registry::SocketId};
use crate::event::{Descriptor, SocketEvent};
use tracing::{trace, warn};

/// The role of the transport endpoint a tracker belongs to.
/// 跟踪器所属传输端点的角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    /// A bound endpoint accepting incoming peers.
    /// 接受传入对端的已绑定端点。
    Listener,
    /// An endpoint connecting out to a remote listener.
    /// 向远端监听器发起连接的端点。
    Connector,
}

/// The lifecycle state of a tracked endpoint.
/// 被跟踪端点的生命周期状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Binding or connecting has begun but not yet succeeded.
    /// 绑定或连接已开始但尚未成功。
    Init,
    /// The listener is bound and accepting peers.
    /// 监听器已绑定并在接受对端。
    Listening,
    /// The connector's connection is established.
    /// 连接器的连接已建立。
    Connected,
    /// A terminal event was emitted; the tracker emits nothing further.
    /// 已发出终态事件；跟踪器不再发出任何事件。
    Done,
}

/// Tracks one transport endpoint through its connection state machine and
/// emits a catalog event on every transition.
///
/// 在连接状态机中跟踪一个传输端点，并在每次转换时发出一个目录事件。
#[derive(Debug)]
pub struct ConnectionTracker {
    socket: SocketId,
    endpoint: String,
    role: EndpointRole,
    state: TrackerState,
    dispatcher: EventDispatcher,
}

impl ConnectionTracker {
    /// Creates a tracker for a listener endpoint.
    /// 为监听端点创建跟踪器。
    pub fn listener(socket: SocketId, endpoint: String, dispatcher: EventDispatcher) -> Self {
        Self {
            socket,
            endpoint,
            role: EndpointRole::Listener,
            state: TrackerState::Init,
            dispatcher,
        }
    }

    /// Creates a tracker for a connector endpoint.
    /// 为连接端点创建跟踪器。
    pub fn connector(socket: SocketId, endpoint: String, dispatcher: EventDispatcher) -> Self {
        Self {
            socket,
            endpoint,
            role: EndpointRole::Connector,
            state: TrackerState::Init,
            dispatcher,
        }
    }

    /// The endpoint address this tracker was configured with.
    /// 此跟踪器配置的端点地址。
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a terminal event (`Closed` or `Disconnected`) has been emitted.
    /// 是否已发出终态事件（`Closed` 或 `Disconnected`）。
    pub fn is_terminal(&self) -> bool {
        self.state == TrackerState::Done
    }

    /// Gets string representation of the current state (for logging).
    /// 获取当前状态的字符串表示（用于日志）。
    pub fn state_name(&self) -> &'static str {
        match self.state {
            TrackerState::Init => "Init",
            TrackerState::Listening => "Listening",
            TrackerState::Connected => "Connected",
            TrackerState::Done => "Done",
        }
    }

    /// The listener bind succeeded: `Init -> Listening`, emits `Listening`.
    /// 监听器绑定成功：`Init -> Listening`，发出 `Listening`。
    pub fn on_listening(&mut self, fd: Descriptor) {
        if self.role != EndpointRole::Listener || self.state != TrackerState::Init {
            self.invariant_violation("Listening");
            return;
        }
        if fd <= 0 {
            self.descriptor_violation("Listening", fd);
            return;
        }
        self.state = TrackerState::Listening;
        self.emit(SocketEvent::Listening {
            endpoint: self.endpoint.clone(),
            fd,
        });
    }

    /// The listener accepted a peer. Emits `Accepted`; the listener's own
    /// state stays `Listening`.
    /// 监听器接受了一个对端。发出 `Accepted`；监听器自身状态保持 `Listening`。
    pub fn on_accepted(&mut self, fd: Descriptor) {
        if self.role != EndpointRole::Listener || self.state != TrackerState::Listening {
            self.invariant_violation("Accepted");
            return;
        }
        if fd <= 0 {
            self.descriptor_violation("Accepted", fd);
            return;
        }
        self.emit(SocketEvent::Accepted {
            endpoint: self.endpoint.clone(),
            fd,
        });
    }

    /// A connection attempt failed and will be retried. Non-terminal; the
    /// connector stays in `Init` and may fire this any number of times.
    /// 一次连接尝试失败，将会重试。非终态；连接器保持 `Init`，
    /// 此事件可发出任意多次。
    pub fn on_connect_delayed(&mut self, err: i32) {
        if self.role != EndpointRole::Connector || self.state != TrackerState::Init {
            self.invariant_violation("ConnectDelayed");
            return;
        }
        if err == 0 {
            self.error_code_violation("ConnectDelayed");
            return;
        }
        self.emit(SocketEvent::ConnectDelayed {
            endpoint: self.endpoint.clone(),
            err,
        });
    }

    /// The connector established its connection: `Init -> Connected`.
    /// 连接器建立了连接：`Init -> Connected`。
    pub fn on_connected(&mut self, fd: Descriptor) {
        if self.role != EndpointRole::Connector || self.state != TrackerState::Init {
            self.invariant_violation("Connected");
            return;
        }
        if fd <= 0 {
            self.descriptor_violation("Connected", fd);
            return;
        }
        self.state = TrackerState::Connected;
        self.emit(SocketEvent::Connected {
            endpoint: self.endpoint.clone(),
            fd,
        });
    }

    /// The connection was severed by the peer or the transport. Terminal.
    /// 连接被对端或传输层切断。终态。
    pub fn on_disconnected(&mut self, fd: Descriptor) {
        if self.role != EndpointRole::Connector || self.state != TrackerState::Connected {
            self.invariant_violation("Disconnected");
            return;
        }
        if fd == 0 {
            self.descriptor_violation("Disconnected", fd);
            return;
        }
        self.state = TrackerState::Done;
        self.emit(SocketEvent::Disconnected {
            endpoint: self.endpoint.clone(),
            fd,
        });
    }

    /// The endpoint was explicitly closed locally. Terminal for both roles:
    /// a listener closes its bound fd, a connector detaches gracefully.
    /// 端点在本地被显式关闭。对两种角色均为终态：监听器关闭其绑定的fd，
    /// 连接器优雅地脱离。
    pub fn on_closed(&mut self, fd: Descriptor) {
        let live = match self.role {
            EndpointRole::Listener => self.state == TrackerState::Listening,
            EndpointRole::Connector => self.state == TrackerState::Connected,
        };
        if !live {
            self.invariant_violation("Closed");
            return;
        }
        if fd == 0 {
            self.descriptor_violation("Closed", fd);
            return;
        }
        self.state = TrackerState::Done;
        self.emit(SocketEvent::Closed {
            endpoint: self.endpoint.clone(),
            fd,
        });
    }

    /// Closing the endpoint failed. Advisory and non-terminal: the endpoint
    /// resource is considered leaked or retryable at the transport layer, and
    /// the tracker keeps operating.
    /// 关闭端点失败。告知性且非终态：端点资源在传输层被视为已泄漏或
    /// 可重试，跟踪器继续工作。
    pub fn on_close_failed(&mut self, err: i32) {
        let live = match self.role {
            EndpointRole::Listener => self.state == TrackerState::Listening,
            EndpointRole::Connector => self.state == TrackerState::Connected,
        };
        if !live {
            self.invariant_violation("CloseFailed");
            return;
        }
        if err == 0 {
            self.error_code_violation("CloseFailed");
            return;
        }
        self.emit(SocketEvent::CloseFailed {
            endpoint: self.endpoint.clone(),
            err,
        });
    }

    fn emit(&self, event: SocketEvent) {
        trace!(
            socket = %self.socket,
            endpoint = %self.endpoint,
            state = self.state_name(),
            kind = ?event.kind(),
            "Endpoint transition recognized"
        );
        self.dispatcher.dispatch(self.socket, event);
    }

    /// A transition that is not legal for this role/state. Fatal defect in
    /// debug builds; diagnostic and dropped in release builds.
    /// 对当前角色/状态不合法的转换。调试构建中为致命缺陷；
    /// 发布构建中记录诊断并丢弃。
    fn invariant_violation(&self, attempted: &str) {
        debug_assert!(
            false,
            "illegal {attempted} transition for {:?} endpoint in state {}",
            self.role,
            self.state_name()
        );
        warn!(
            socket = %self.socket,
            endpoint = %self.endpoint,
            role = ?self.role,
            state = self.state_name(),
            attempted,
            "Illegal tracker transition, event dropped"
        );
    }

    /// An I/O-bearing transition fired without a resolvable OS handle. The
    /// event must not be emitted with a fabricated descriptor.
    /// I/O相关转换在没有可解析操作系统句柄的情况下触发。
    /// 不得用伪造的描述符发出该事件。
    fn descriptor_violation(&self, attempted: &str, fd: Descriptor) {
        debug_assert!(false, "{attempted} transition without a valid descriptor ({fd})");
        warn!(
            socket = %self.socket,
            endpoint = %self.endpoint,
            attempted,
            fd,
            "I/O-bearing transition without a valid descriptor, event dropped"
        );
    }

    /// A failure-class transition fired with a zero error code.
    /// 失败类转换携带了为零的错误码。
    fn error_code_violation(&self, attempted: &str) {
        debug_assert!(false, "{attempted} transition with a zero error code");
        warn!(
            socket = %self.socket,
            endpoint = %self.endpoint,
            attempted,
            "Failure transition with a zero error code, event dropped"
        );
    }
}
