//! TCP实现的流式传输。
//! The TCP implementation of the stream transport.

use super::traits::StreamTransport;
use crate::{error::Result, event::Descriptor};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::os::fd::AsRawFd;
use tokio::net::{TcpListener, TcpStream};

/// `StreamTransport` over tokio TCP sockets.
/// 基于tokio TCP套接字的 `StreamTransport`。
#[derive(Debug)]
pub struct TcpTransport;

#[async_trait]
impl StreamTransport for TcpTransport {
    type Listener = TcpListener;
    type Stream = TcpStream;

    async fn bind(addr: SocketAddr) -> Result<TcpListener> {
        TcpListener::bind(addr).await.map_err(Into::into)
    }

    async fn accept(listener: &TcpListener) -> Result<(TcpStream, SocketAddr)> {
        listener.accept().await.map_err(Into::into)
    }

    async fn connect(addr: SocketAddr) -> Result<TcpStream> {
        TcpStream::connect(addr).await.map_err(Into::into)
    }

    fn listener_descriptor(listener: &TcpListener) -> Descriptor {
        listener.as_raw_fd()
    }

    fn stream_descriptor(stream: &TcpStream) -> Descriptor {
        stream.as_raw_fd()
    }
}
