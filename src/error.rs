//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use crate::monitor::SocketId;
use thiserror::Error;

/// The primary error type for the monitoring library.
/// 监控库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying I/O error occurred.
    /// 发生了底层的I/O错误。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during address parsing.
    /// 地址解析期间发生错误。
    #[error("Address parsing error: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    /// The endpoint URI does not use a supported scheme.
    /// 端点URI未使用受支持的scheme。
    #[error("Unsupported endpoint scheme in \"{0}\"")]
    UnsupportedScheme(String),

    /// The socket id is not attached to the registry (never created, or
    /// already destroyed).
    /// 该套接字id未挂接到注册表（从未创建，或已被销毁）。
    #[error("Unknown socket: {0}")]
    UnknownSocket(SocketId),

    /// The connection was closed by the peer.
    /// 连接被对端关闭。
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// The operation requires a connected endpoint, but none is available.
    /// 操作需要已连接的端点，但当前没有可用的端点。
    #[error("Endpoint is not connected")]
    NotConnected,

    /// A request/reply exchange is already in flight on this endpoint.
    /// 该端点上已有一个请求/应答交换正在进行。
    #[error("A request is already in flight")]
    RequestInFlight,

    /// A received frame exceeds the configured maximum frame size.
    /// 接收到的帧超出了配置的最大帧大小。
    #[error("Frame exceeds the configured maximum size")]
    FrameTooLarge,

    /// An internal channel for communication between tasks was closed unexpectedly.
    /// 用于任务间通信的内部通道意外关闭。
    #[error("Internal channel is broken")]
    ChannelClosed,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Io(e) => e,
            Error::AddressParse(e) => std::io::Error::new(ErrorKind::InvalidInput, e),
            Error::UnsupportedScheme(s) => std::io::Error::new(ErrorKind::InvalidInput, s),
            Error::UnknownSocket(id) => {
                std::io::Error::new(ErrorKind::NotFound, format!("unknown socket {id}"))
            }
            Error::ConnectionClosed => ErrorKind::ConnectionReset.into(),
            Error::NotConnected => ErrorKind::NotConnected.into(),
            Error::RequestInFlight => ErrorKind::ResourceBusy.into(),
            Error::FrameTooLarge => ErrorKind::InvalidData.into(),
            Error::ChannelClosed => ErrorKind::BrokenPipe.into(),
        }
    }
}

/// Extracts a nonzero OS error code from an I/O error.
///
/// Failure events are required to carry a nonzero `error_code`; when the
/// platform gives us no raw errno, fall back to `-1` rather than fabricate one.
///
/// 从I/O错误中提取非零的操作系统错误码。
///
/// 失败类事件必须携带非零的 `error_code`；当平台未提供原始errno时，
/// 回退为 `-1` 而不是伪造一个。
pub(crate) fn os_error_code(err: &std::io::Error) -> i32 {
    err.raw_os_error().filter(|code| *code != 0).unwrap_or(-1)
}
