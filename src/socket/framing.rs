//! 请求/应答交换使用的长度前缀帧编解码。
//! The length-prefixed frame codec used by request/reply exchanges.

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Writes one frame: a u32 big-endian length prefix followed by the payload.
///
/// An over-limit payload is rejected before anything touches the wire, so the
/// stream stays usable. The length prefix is a u32, which also caps what the
/// wire format can carry.
///
/// 写入一个帧：u32大端长度前缀，后跟载荷。
///
/// 超限的载荷在触碰线路之前就被拒绝，因此流保持可用。
/// 长度前缀是u32，这同样限制了线路格式所能承载的大小。
pub(crate) async fn write_frame<W>(writer: &mut W, payload: &Bytes, max_frame_size: usize) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > max_frame_size.min(u32::MAX as usize) {
        return Err(Error::FrameTooLarge);
    }

    let mut buf = BytesMut::with_capacity(4 + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. Returns `Ok(None)` on a clean EOF at a frame boundary;
/// an EOF inside a frame is an error.
/// 读取一个帧。在帧边界处遇到干净的EOF时返回 `Ok(None)`；
/// 帧内部的EOF是错误。
pub(crate) async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut head = [0u8; 4];
    match reader.read_exact(&mut head).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(head) as usize;
    if len > max_frame_size {
        return Err(Error::FrameTooLarge);
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(Bytes::from(payload)))
}
