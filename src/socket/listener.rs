//! 监听端点任务：accept循环，为每个对端提供bounce应答服务。
//! The listener endpoint task: the accept loop, serving bounce replies to
//! each accepted peer.

use super::{framing, traits::StreamTransport};
use crate::{config::Config, monitor::ConnectionTracker};
use std::sync::Arc;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::oneshot,
    task::JoinSet,
};
use tracing::{debug, error, trace, warn};

/// Runs one listener endpoint until it is shut down.
///
/// The task owns the endpoint's tracker exclusively: `Accepted` fires once per
/// peer without changing the listener's own state, and `Closed` fires exactly
/// once when the shutdown signal arrives (or the owning handle is dropped).
/// Accepted peer streams are served as bounce echoes and carry no tracker of
/// their own; the connecting side reports their lifecycle.
///
/// 运行一个监听端点直至其被关闭。
///
/// 任务独占拥有该端点的跟踪器：每个对端触发一次 `Accepted` 而不改变
/// 监听器自身状态；关闭信号到达（或持有句柄被丢弃）时恰好触发一次
/// `Closed`。被接受的对端流以bounce回显方式服务，自身不携带跟踪器；
/// 其生命周期由发起连接的一侧上报。
pub(crate) async fn run_listener<T: StreamTransport>(
    listener: T::Listener,
    mut tracker: ConnectionTracker,
    mut shutdown_rx: oneshot::Receiver<()>,
    config: Arc<Config>,
) {
    let listener_fd = T::listener_descriptor(&listener);
    let mut peer_tasks = JoinSet::new();

    loop {
        tokio::select! {
            // Explicit shutdown, or the socket handle was dropped.
            // 显式关闭，或套接字句柄已被丢弃。
            _ = &mut shutdown_rx => break,

            accepted = T::accept(&listener) => match accepted {
                Ok((stream, peer_addr)) => {
                    let fd = T::stream_descriptor(&stream);
                    debug!(
                        endpoint = tracker.endpoint(),
                        peer = %peer_addr,
                        fd,
                        "Accepted incoming peer connection"
                    );
                    tracker.on_accepted(fd);
                    peer_tasks.spawn(serve_peer(stream, config.transport.max_frame_size));
                }
                Err(e) => {
                    warn!(
                        endpoint = tracker.endpoint(),
                        error = %e,
                        "Accept failed, backing off"
                    );
                    tokio::time::sleep(config.transport.accept_error_backoff).await;
                }
            },

            Some(finished) = peer_tasks.join_next(), if !peer_tasks.is_empty() => {
                if let Err(e) = finished {
                    if !e.is_cancelled() {
                        error!(endpoint = tracker.endpoint(), error = %e, "Peer task failed");
                    }
                }
            }
        }
    }

    // Sever the accepted peer streams first, then close the listening fd.
    // 先切断已接受的对端流，再关闭监听fd。
    peer_tasks.shutdown().await;
    drop(listener);
    tracker.on_closed(listener_fd);
}

/// Serves one accepted peer: every received frame is bounced straight back.
/// 服务一个被接受的对端：每个收到的帧被原样弹回。
async fn serve_peer<S>(mut stream: S, max_frame_size: usize)
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    loop {
        match framing::read_frame(&mut stream, max_frame_size).await {
            Ok(Some(payload)) => {
                trace!(len = payload.len(), "Bouncing frame back to peer");
                if let Err(e) = framing::write_frame(&mut stream, &payload, max_frame_size).await {
                    debug!(error = %e, "Peer write failed, stopping");
                    break;
                }
            }
            Ok(None) => {
                trace!("Peer closed its connection");
                break;
            }
            Err(e) => {
                debug!(error = %e, "Peer read failed, stopping");
                break;
            }
        }
    }
}
