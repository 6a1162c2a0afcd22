//! 事件分发器 - 将跟踪器发出的事件送达所属套接字的观察者。
//! Event Dispatcher - Delivers tracker-emitted events to the owning socket's observer.
//!
//! Delivery is synchronous on the thread that detected the transition, in
//! emission order, with no queueing or retry. Observer faults are isolated
//! here so they can never corrupt the transport's own state machine.
//!
//! 投递在检测到转换的线程上同步进行，按发出顺序，不排队也不重试。
//! 观察者故障在此被隔离，因此永远不会破坏传输层自身的状态机。

use super::registry::{MonitorRegistry, SocketId};
use crate::event::SocketEvent;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{error, trace};

/// Delivers lifecycle events to the observer registered for a socket.
/// 将生命周期事件送达为套接字注册的观察者。
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    registry: Arc<MonitorRegistry>,
}

impl EventDispatcher {
    /// Creates a dispatcher backed by the given registry.
    /// 创建由给定注册表支持的分发器。
    pub fn new(registry: Arc<MonitorRegistry>) -> Self {
        Self { registry }
    }

    /// Delivers one event to the observer of `socket`, or discards it when no
    /// observer is registered.
    ///
    /// Fire-and-forget per event: the call returns once the observer returns,
    /// and a panicking observer is caught and logged rather than propagated
    /// into the calling I/O path.
    ///
    /// 将一个事件送达 `socket` 的观察者，若无注册观察者则丢弃。
    ///
    /// 每事件即发即弃：观察者返回后调用即返回；观察者panic会被捕获并
    /// 记录日志，而不会传播到调用方的I/O路径。
    pub fn dispatch(&self, socket: SocketId, event: SocketEvent) {
        let kind = event.kind();
        let Some(registration) = self.registry.lookup(socket) else {
            trace!(socket = %socket, ?kind, "No observer registered, event dropped");
            return;
        };

        trace!(socket = %socket, ?kind, endpoint = event.endpoint(), "Delivering lifecycle event");
        let delivery = panic::catch_unwind(AssertUnwindSafe(|| {
            registration.deliver(socket, &event);
        }));
        if let Err(payload) = delivery {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(
                socket = %socket,
                ?kind,
                panic = %reason,
                "Observer panicked during event delivery, fault isolated"
            );
        }
    }
}
