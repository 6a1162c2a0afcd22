//! The monitor core: observer registration, event dispatch, and per-endpoint
//! connection state tracking.
//! 监控核心：观察者注册、事件分发以及按端点的连接状态跟踪。

pub mod dispatcher;
pub mod registry;
pub mod tracker;

pub use dispatcher::EventDispatcher;
pub use registry::{MonitorCallback, MonitorRegistry, SocketId};
pub use tracker::ConnectionTracker;
