//! Traits for abstracting over stream transport implementations.
//! 用于对流式传输实现进行抽象的trait。

use crate::{error::Result, event::Descriptor};
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};

/// A connection-oriented stream transport.
///
/// This trait allows for abstracting over the underlying transport,
/// enabling custom implementations for testing or other purposes. Descriptor
/// accessors expose the OS handle that lifecycle events must carry for
/// I/O-bearing transitions.
///
/// 面向连接的流式传输。
///
/// 此trait允许对底层传输进行抽象，从而可以为测试或其他目的自定义实现。
/// 描述符访问器暴露生命周期事件在I/O相关转换中必须携带的操作系统句柄。
#[async_trait]
pub trait StreamTransport: Send + Sync + 'static {
    /// The listening side of the transport.
    /// 传输的监听侧。
    type Listener: Send + Sync + 'static;
    /// One established byte stream.
    /// 一条已建立的字节流。
    type Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    /// Binds a new listener to the given address.
    /// 将新监听器绑定到给定地址。
    async fn bind(addr: SocketAddr) -> Result<Self::Listener>;

    /// Waits for and accepts one incoming connection.
    /// 等待并接受一个传入连接。
    async fn accept(listener: &Self::Listener) -> Result<(Self::Stream, SocketAddr)>;

    /// Opens a connection to the given address.
    /// 打开到给定地址的连接。
    async fn connect(addr: SocketAddr) -> Result<Self::Stream>;

    /// The OS handle of a bound listener.
    /// 已绑定监听器的操作系统句柄。
    fn listener_descriptor(listener: &Self::Listener) -> Descriptor;

    /// The OS handle of an established stream.
    /// 已建立流的操作系统句柄。
    fn stream_descriptor(stream: &Self::Stream) -> Descriptor;
}
