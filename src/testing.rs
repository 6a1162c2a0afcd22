//! 测试辅助工具：收集已送达生命周期事件的观察者。
//! Test helpers: an observer that records delivered lifecycle events.

use crate::{
    event::{EventKind, SocketEvent},
    monitor::{MonitorCallback, SocketId},
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Records every event delivered to it, preserving delivery order.
///
/// Clone the recorder to keep a handle for assertions while its callback is
/// installed on a socket.
///
/// 记录送达给它的每个事件，保留投递顺序。
///
/// 克隆记录器即可在其回调安装到套接字上之后，仍持有用于断言的句柄。
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<(SocketId, SocketEvent)>>>,
}

impl EventRecorder {
    /// Creates an empty recorder.
    /// 创建一个空的记录器。
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a monitor callback that appends into this recorder.
    /// 构建一个向此记录器追加记录的监控回调。
    pub fn callback(&self) -> MonitorCallback {
        let events = self.events.clone();
        Arc::new(move |socket, _kind, event| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((socket, event.clone()));
        })
    }

    /// All recorded events, in delivery order.
    /// 按投递顺序返回所有已记录的事件。
    pub fn events(&self) -> Vec<(SocketId, SocketEvent)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The kinds of all recorded events, in delivery order.
    /// 所有已记录事件的种类，按投递顺序。
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(|(_, event)| event.kind()).collect()
    }

    /// The kinds recorded for one socket, in delivery order.
    /// 为单个套接字记录的事件种类，按投递顺序。
    pub fn kinds_for(&self, socket: SocketId) -> Vec<EventKind> {
        self.events()
            .iter()
            .filter(|(id, _)| *id == socket)
            .map(|(_, event)| event.kind())
            .collect()
    }

    /// Waits until at least `count` events of `kind` have been recorded.
    ///
    /// Polls; callers are expected to wrap this in `tokio::time::timeout`.
    ///
    /// 等待直到记录了至少 `count` 个 `kind` 种类的事件。
    ///
    /// 轮询实现；调用方应以 `tokio::time::timeout` 包裹。
    pub async fn wait_for_kind_count(&self, kind: EventKind, count: usize) {
        loop {
            let seen = self.kinds().iter().filter(|k| **k == kind).count();
            if seen >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Waits until at least one event of `kind` has been recorded.
    /// 等待直到记录了至少一个 `kind` 种类的事件。
    pub async fn wait_for_kind(&self, kind: EventKind) {
        self.wait_for_kind_count(kind, 1).await;
    }

    /// Number of events recorded so far.
    /// 目前已记录的事件数量。
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no events have been recorded.
    /// 是否尚未记录任何事件。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
