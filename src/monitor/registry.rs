//! 监控注册表 - 每个套接字至多一个观察者的线程安全注册。
//! Monitor Registry - Thread-safe registration of at most one observer per socket.
//!
//! Registration is rare and dispatch is frequent, so the per-socket slots live
//! in a sharded map: the hot `lookup` path takes a shard read lock and clones
//! one `Arc`, while `register`/`unregister` briefly take a shard write lock.
//!
//! 注册很少发生而分发非常频繁，因此每套接字的槽位存放在分片映射中：
//! 热路径 `lookup` 只获取分片读锁并克隆一个 `Arc`，
//! 而 `register`/`unregister` 短暂持有分片写锁。

use crate::{
    error::{Error, Result},
    event::{EventKind, SocketEvent},
};
use dashmap::DashMap;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};
use tracing::debug;

/// An opaque identifier for a messaging socket, allocated by the registry.
/// 消息套接字的不透明标识符，由注册表分配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(u64);

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The observer callback invoked for every delivered lifecycle event.
/// 每个被送达的生命周期事件所调用的观察者回调。
pub type MonitorCallback = Arc<dyn Fn(SocketId, EventKind, &SocketEvent) + Send + Sync + 'static>;

/// One installed observer: the callback plus an enabled flag.
///
/// The flag is lowered when the registration is superseded or cleared, so a
/// dispatch that raced the replacement and still holds the old `Arc` stops
/// delivering as soon as possible. An event already mid-delivery is not
/// retroactively cancelled.
///
/// 一个已安装的观察者：回调加一个启用标志。
///
/// 当注册被取代或清除时标志会被放下，使得与替换竞争、仍持有旧 `Arc`
/// 的分发尽快停止投递。已经在投递中的事件不会被追溯取消。
pub struct MonitorRegistration {
    observer: MonitorCallback,
    enabled: AtomicBool,
}

impl MonitorRegistration {
    fn new(observer: MonitorCallback) -> Self {
        Self {
            observer,
            enabled: AtomicBool::new(true),
        }
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Invokes the observer for one event.
    /// 为一个事件调用观察者。
    pub(crate) fn deliver(&self, socket: SocketId, event: &SocketEvent) {
        (self.observer)(socket, event.kind(), event);
    }
}

impl fmt::Debug for MonitorRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorRegistration")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

/// The per-socket observer slot.
/// 每套接字的观察者槽位。
#[derive(Debug, Default)]
struct MonitorSlot {
    registration: Option<Arc<MonitorRegistration>>,
}

/// Per-socket registration of lifecycle event observers.
///
/// A socket has zero or one active registrations at any time; registering a
/// new observer atomically supersedes the previous one.
///
/// 生命周期事件观察者的按套接字注册。
///
/// 任一时刻一个套接字拥有零个或一个活跃注册；注册新观察者会原子地
/// 取代先前的观察者。
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    next_id: AtomicU64,
    slots: DashMap<SocketId, MonitorSlot>,
}

impl MonitorRegistry {
    /// Creates an empty registry.
    /// 创建一个空的注册表。
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh socket id and attaches a live slot for it.
    ///
    /// Called by the socket facade when a socket is created; registration on
    /// an id that was never attached (or already detached) is rejected.
    ///
    /// 分配一个新的套接字id并为其挂接一个活跃槽位。
    ///
    /// 由套接字门面在创建套接字时调用；对从未挂接（或已被解除挂接）
    /// 的id进行注册会被拒绝。
    pub fn attach(&self) -> SocketId {
        let id = SocketId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.slots.insert(id, MonitorSlot::default());
        debug!(socket = %id, "Socket attached to monitor registry");
        id
    }

    /// Removes the socket's slot and clears any registration it held.
    ///
    /// Idempotent: detaching an unknown or already detached socket is a no-op.
    ///
    /// 移除套接字槽位并清除其持有的任何注册。
    ///
    /// 幂等：对未知或已解除挂接的套接字再次解除挂接是空操作。
    pub fn detach(&self, socket: SocketId) {
        if let Some((_, slot)) = self.slots.remove(&socket) {
            if let Some(registration) = slot.registration {
                registration.disable();
            }
            debug!(socket = %socket, "Socket detached from monitor registry");
        }
    }

    /// Installs `observer` as the sole active observer for `socket`,
    /// superseding any prior observer. No error if none previously existed.
    ///
    /// 将 `observer` 安装为 `socket` 唯一的活跃观察者，取代任何先前的
    /// 观察者。先前不存在观察者时不报错。
    pub fn register(&self, socket: SocketId, observer: MonitorCallback) -> Result<()> {
        let mut slot = self
            .slots
            .get_mut(&socket)
            .ok_or(Error::UnknownSocket(socket))?;
        let previous = slot
            .registration
            .replace(Arc::new(MonitorRegistration::new(observer)));
        if let Some(previous) = previous {
            previous.disable();
            debug!(socket = %socket, "Monitor observer superseded");
        } else {
            debug!(socket = %socket, "Monitor observer registered");
        }
        Ok(())
    }

    /// Clears the registration for `socket`; subsequent events are dropped
    /// until re-registered. Idempotent, never an error.
    ///
    /// 清除 `socket` 的注册；后续事件将被丢弃，直到重新注册。
    /// 幂等，永不报错。
    pub fn unregister(&self, socket: SocketId) {
        if let Some(mut slot) = self.slots.get_mut(&socket) {
            if let Some(previous) = slot.registration.take() {
                previous.disable();
                debug!(socket = %socket, "Monitor observer unregistered");
            }
        }
    }

    /// Returns the enabled registration for `socket`, if any.
    ///
    /// This is the hot read on the event-emission path: one shard read lock
    /// and one `Arc` clone.
    ///
    /// 返回 `socket` 的已启用注册（若有）。
    ///
    /// 这是事件发出路径上的热读取：一次分片读锁和一次 `Arc` 克隆。
    pub fn lookup(&self, socket: SocketId) -> Option<Arc<MonitorRegistration>> {
        self.slots
            .get(&socket)
            .and_then(|slot| slot.registration.clone())
            .filter(|registration| registration.is_enabled())
    }
}
