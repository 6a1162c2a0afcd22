#![deny(clippy::expect_used, clippy::unwrap_used)]

//! Connection lifecycle event monitoring for messaging sockets.
//! 消息套接字的连接生命周期事件监控。
//!
//! A socket's transport endpoints (listeners and connectors) advance through a
//! private connection state machine; every transition emits exactly one typed
//! lifecycle event which is delivered, in emission order, to the observer
//! registered for that socket.
//!
//! 套接字的传输端点（监听器与连接器）在私有的连接状态机中推进；
//! 每次状态转换恰好发出一个类型化的生命周期事件，并按发出顺序
//! 送达为该套接字注册的观察者。

pub mod config;
pub mod error;
pub mod event;
pub mod monitor;
pub mod socket;
pub mod testing;
