//! 连接端点任务：带重试的连接建立和锁步的请求/应答交换。
//! The connector endpoint task: connection establishment with retry and the
//! lock-step request/reply exchange.

use super::{framing, traits::StreamTransport};
use crate::{
    config::{Config, ConnectConfig},
    error::{Error, Result, os_error_code},
    monitor::ConnectionTracker,
};
use bytes::Bytes;
use rand::Rng;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

/// Commands a socket handle sends to its connector endpoint task.
/// 套接字句柄发送给其连接端点任务的命令。
pub(crate) enum ConnectorCommand {
    /// One lock-step request/reply exchange.
    /// 一次锁步的请求/应答交换。
    Request {
        payload: Bytes,
        reply_tx: oneshot::Sender<Result<Bytes>>,
    },
    /// Graceful local detach of this endpoint: reported as `Closed`.
    /// 本端点的优雅本地脱离：上报为 `Closed`。
    Detach,
    /// Abrupt socket-wide teardown: the severed transport is reported as
    /// `Disconnected`.
    /// 套接字级的突然拆除：被切断的传输上报为 `Disconnected`。
    Teardown,
}

/// Runs one connector endpoint to completion.
///
/// The task owns the endpoint's tracker exclusively. Every failed connection
/// attempt emits `ConnectDelayed` with the OS error code, then the attempt is
/// retried with jittered backoff until it succeeds or the retry budget is
/// exhausted.
///
/// 运行一个连接端点直至结束。
///
/// 任务独占拥有该端点的跟踪器。每次失败的连接尝试都会携带操作系统
/// 错误码发出 `ConnectDelayed`，之后以带抖动的退避重试，直到成功或
/// 重试预算耗尽。
pub(crate) async fn run_connector<T: StreamTransport>(
    mut tracker: ConnectionTracker,
    addr: SocketAddr,
    config: Arc<Config>,
    mut command_rx: mpsc::Receiver<ConnectorCommand>,
) {
    let mut attempts = 0u32;
    let stream = loop {
        match T::connect(addr).await {
            Ok(stream) => break stream,
            Err(e) => {
                let code = match &e {
                    Error::Io(io_err) => os_error_code(io_err),
                    _ => -1,
                };
                debug!(
                    endpoint = tracker.endpoint(),
                    err = code,
                    attempts,
                    "Connection attempt failed"
                );
                tracker.on_connect_delayed(code);

                attempts += 1;
                if attempts > config.connect.max_retries {
                    warn!(
                        endpoint = tracker.endpoint(),
                        attempts, "Connect retry budget exhausted, giving up"
                    );
                    return;
                }

                // Commands handled during the backoff must not shorten the
                // retry interval, so the wait resumes against a fixed deadline.
                // 退避期间处理的命令不得缩短重试间隔，
                // 因此等待会基于固定的截止时间继续。
                let deadline = tokio::time::Instant::now() + retry_delay(&config.connect);
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => break,
                        cmd = command_rx.recv() => match cmd {
                            Some(ConnectorCommand::Request { reply_tx, .. }) => {
                                let _ = reply_tx.send(Err(Error::NotConnected));
                            }
                            // Closing a connector that never connected emits
                            // nothing: there is no descriptor to report.
                            // 关闭一个从未连接成功的连接器不发出任何事件：
                            // 没有可上报的描述符。
                            Some(ConnectorCommand::Detach)
                            | Some(ConnectorCommand::Teardown)
                            | None => return,
                        }
                    }
                }
            }
        }
    };

    let fd = T::stream_descriptor(&stream);
    tracker.on_connected(fd);

    let (mut reader, mut writer) = tokio::io::split(stream);
    let max_frame_size = config.transport.max_frame_size;
    // Lock-step request/reply: at most one reply is ever outstanding, so the
    // read arm only completes on a reply or on severance.
    // 锁步请求/应答：任一时刻至多有一个未完成的应答，因此读分支只会在
    // 收到应答或连接被切断时完成。
    let mut pending_reply: Option<oneshot::Sender<Result<Bytes>>> = None;

    loop {
        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(ConnectorCommand::Request { payload, reply_tx }) => {
                    if pending_reply.is_some() {
                        let _ = reply_tx.send(Err(Error::RequestInFlight));
                        continue;
                    }
                    match framing::write_frame(&mut writer, &payload, max_frame_size).await {
                        Ok(()) => pending_reply = Some(reply_tx),
                        // Rejected before touching the wire: the caller gets
                        // the error and the connection stays up.
                        // 在触碰线路之前被拒绝：调用者收到错误，连接保持。
                        Err(Error::FrameTooLarge) => {
                            let _ = reply_tx.send(Err(Error::FrameTooLarge));
                        }
                        Err(e) => {
                            debug!(endpoint = tracker.endpoint(), error = %e, "Request write failed");
                            let _ = reply_tx.send(Err(e));
                            tracker.on_disconnected(fd);
                            return;
                        }
                    }
                }
                Some(ConnectorCommand::Detach) => {
                    use tokio::io::AsyncWriteExt;
                    let _ = writer.shutdown().await;
                    tracker.on_closed(fd);
                    return;
                }
                Some(ConnectorCommand::Teardown) | None => {
                    tracker.on_disconnected(fd);
                    return;
                }
            },

            reply = framing::read_frame(&mut reader, max_frame_size) => match reply {
                Ok(Some(payload)) => {
                    trace!(endpoint = tracker.endpoint(), len = payload.len(), "Reply received");
                    match pending_reply.take() {
                        Some(reply_tx) => {
                            let _ = reply_tx.send(Ok(payload));
                        }
                        None => warn!(
                            endpoint = tracker.endpoint(),
                            "Unsolicited frame from peer, dropped"
                        ),
                    }
                }
                Ok(None) => {
                    debug!(endpoint = tracker.endpoint(), "Peer severed the connection");
                    if let Some(reply_tx) = pending_reply.take() {
                        let _ = reply_tx.send(Err(Error::ConnectionClosed));
                    }
                    tracker.on_disconnected(fd);
                    return;
                }
                Err(e) => {
                    debug!(endpoint = tracker.endpoint(), error = %e, "Transport read failed");
                    if let Some(reply_tx) = pending_reply.take() {
                        let _ = reply_tx.send(Err(Error::ConnectionClosed));
                    }
                    tracker.on_disconnected(fd);
                    return;
                }
            }
        }
    }
}

/// The base retry interval plus a random jitter slice.
/// 基础重试间隔加一段随机抖动。
fn retry_delay(config: &ConnectConfig) -> Duration {
    let jitter_ms = config.retry_jitter.as_millis() as u64;
    if jitter_ms == 0 {
        return config.retry_interval;
    }
    config.retry_interval + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
}
