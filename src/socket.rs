//! The socket-level API hosting the monitor: endpoint URIs, the stream
//! transport abstraction, framing, endpoint tasks, and the facade handle.
//! 承载监控的套接字级API：端点URI、流传输抽象、帧、端点任务以及门面句柄。

pub mod connector;
pub mod endpoint;
mod framing;
pub mod handle;
pub mod listener;
pub mod traits;
pub mod transport;

pub use endpoint::Endpoint;
pub use handle::MessagingSocket;
pub use traits::StreamTransport;
pub use transport::TcpTransport;

#[cfg(test)]
mod tests;
