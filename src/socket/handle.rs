//! 面向用户的消息套接字句柄。
//! The user-facing messaging socket handle.

use super::{
    connector::{self, ConnectorCommand},
    endpoint::Endpoint,
    listener,
    traits::StreamTransport,
};
use crate::{
    config::Config,
    error::{Error, Result},
    monitor::{ConnectionTracker, EventDispatcher, MonitorCallback, MonitorRegistry, SocketId},
};
use bytes::Bytes;
use std::{marker::PhantomData, sync::Arc};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{error, info};

/// Handle to one spawned listener endpoint task.
/// 一个已生成的监听端点任务的句柄。
struct ListenerHandle {
    endpoint: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// Handle to one spawned connector endpoint task.
/// 一个已生成的连接端点任务的句柄。
struct ConnectorHandle {
    endpoint: String,
    command_tx: mpsc::Sender<ConnectorCommand>,
    task: JoinHandle<()>,
}

/// A messaging socket hosting the lifecycle monitor.
///
/// The socket owns its transport endpoints; each endpoint runs in its own task
/// with its own `ConnectionTracker`, and the monitor components are invoked
/// from whichever task detects a transition. There is no dedicated monitor
/// thread.
///
/// 承载生命周期监控的消息套接字。
///
/// 套接字拥有其传输端点；每个端点运行在自己的任务中并拥有自己的
/// `ConnectionTracker`，监控组件由检测到转换的任务调用。
/// 不存在专用的监控线程。
pub struct MessagingSocket<T: StreamTransport> {
    id: SocketId,
    registry: Arc<MonitorRegistry>,
    dispatcher: EventDispatcher,
    config: Arc<Config>,
    listeners: Vec<ListenerHandle>,
    connectors: Vec<ConnectorHandle>,
    _marker: PhantomData<T>,
}

impl<T: StreamTransport> MessagingSocket<T> {
    /// Creates a socket and attaches it to the monitor registry.
    /// 创建套接字并将其挂接到监控注册表。
    pub fn new(registry: Arc<MonitorRegistry>, config: Arc<Config>) -> Self {
        let id = registry.attach();
        let dispatcher = EventDispatcher::new(registry.clone());
        Self {
            id,
            registry,
            dispatcher,
            config,
            listeners: Vec::new(),
            connectors: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// This socket's identifier in the monitor registry.
    /// 此套接字在监控注册表中的标识符。
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// Installs (or clears) the lifecycle event observer for this socket.
    ///
    /// `Some(callback)` supersedes any prior observer; `None` is equivalent to
    /// unregistering, after which events are silently dropped.
    ///
    /// 为此套接字安装（或清除）生命周期事件观察者。
    ///
    /// `Some(callback)` 取代任何先前的观察者；`None` 等价于注销，
    /// 之后事件将被静默丢弃。
    pub fn monitor(&self, callback: Option<MonitorCallback>) -> Result<()> {
        match callback {
            Some(callback) => self.registry.register(self.id, callback),
            None => {
                self.registry.unregister(self.id);
                Ok(())
            }
        }
    }

    /// Binds a listener endpoint to `uri`.
    ///
    /// The transport is bound in the caller's context and `Listening` is
    /// emitted synchronously before the accept loop is spawned.
    ///
    /// 将监听端点绑定到 `uri`。
    ///
    /// 传输在调用者上下文中完成绑定，`Listening` 在accept循环生成之前
    /// 同步发出。
    pub async fn bind(&mut self, uri: &str) -> Result<()> {
        let endpoint = Endpoint::parse(uri)?;
        let listener = T::bind(endpoint.addr()).await?;

        let mut tracker =
            ConnectionTracker::listener(self.id, endpoint.uri().to_string(), self.dispatcher.clone());
        tracker.on_listening(T::listener_descriptor(&listener));
        info!(socket = %self.id, endpoint = endpoint.uri(), "Listener endpoint bound");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(listener::run_listener::<T>(
            listener,
            tracker,
            shutdown_rx,
            self.config.clone(),
        ));
        self.listeners.push(ListenerHandle {
            endpoint: endpoint.uri().to_string(),
            shutdown_tx: Some(shutdown_tx),
            task,
        });
        Ok(())
    }

    /// Starts connecting a connector endpoint to `uri`.
    ///
    /// Returns immediately; connection progress is observable through the
    /// monitor (`ConnectDelayed` per failed attempt, then `Connected`).
    ///
    /// 开始将连接端点连接到 `uri`。
    ///
    /// 立即返回；连接进度可通过监控观察（每次失败尝试一个
    /// `ConnectDelayed`，随后是 `Connected`）。
    pub fn connect(&mut self, uri: &str) -> Result<()> {
        let endpoint = Endpoint::parse(uri)?;
        let tracker =
            ConnectionTracker::connector(self.id, endpoint.uri().to_string(), self.dispatcher.clone());
        info!(socket = %self.id, endpoint = endpoint.uri(), "Connector endpoint starting");

        let (command_tx, command_rx) = mpsc::channel(self.config.transport.command_queue_capacity);
        let task = tokio::spawn(connector::run_connector::<T>(
            tracker,
            endpoint.addr(),
            self.config.clone(),
            command_rx,
        ));
        self.connectors.push(ConnectorHandle {
            endpoint: endpoint.uri().to_string(),
            command_tx,
            task,
        });
        Ok(())
    }

    /// One request/reply exchange over the first connector endpoint.
    /// 通过第一个连接端点进行一次请求/应答交换。
    pub async fn request(&self, payload: Bytes) -> Result<Bytes> {
        let connector = self.connectors.first().ok_or(Error::NotConnected)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        connector
            .command_tx
            .send(ConnectorCommand::Request { payload, reply_tx })
            .await
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.await.map_err(|_| Error::ChannelClosed)?
    }

    /// Gracefully detaches the connector endpoint configured with `uri`.
    ///
    /// The endpoint's tracker reports the local explicit close as `Closed`.
    ///
    /// 优雅地脱离以 `uri` 配置的连接端点。
    ///
    /// 端点跟踪器将这次显式的本地关闭上报为 `Closed`。
    pub async fn disconnect(&mut self, uri: &str) -> Result<()> {
        let position = self
            .connectors
            .iter()
            .position(|c| c.endpoint == uri)
            .ok_or(Error::NotConnected)?;
        let connector = self.connectors.remove(position);
        let _ = connector.command_tx.send(ConnectorCommand::Detach).await;
        if let Err(e) = connector.task.await {
            error!(socket = %self.id, error = %e, "Connector task failed during detach");
        }
        Ok(())
    }

    /// Tears the whole socket down.
    ///
    /// Connector endpoints are severed abruptly (`Disconnected`), listener
    /// endpoints close their fd (`Closed`). All terminal events are delivered
    /// before the socket is detached from the registry, so an observer
    /// registered at close time sees the full teardown.
    ///
    /// 拆除整个套接字。
    ///
    /// 连接端点被突然切断（`Disconnected`），监听端点关闭其fd
    /// （`Closed`）。所有终态事件都会在套接字从注册表解除挂接之前
    /// 送达，因此关闭时已注册的观察者能看到完整的拆除过程。
    pub async fn close(&mut self) {
        for connector in self.connectors.drain(..) {
            let _ = connector.command_tx.send(ConnectorCommand::Teardown).await;
            if let Err(e) = connector.task.await {
                error!(
                    socket = %self.id,
                    endpoint = %connector.endpoint,
                    error = %e,
                    "Connector task failed during close"
                );
            }
        }
        for mut listener in self.listeners.drain(..) {
            if let Some(shutdown_tx) = listener.shutdown_tx.take() {
                let _ = shutdown_tx.send(());
            }
            if let Err(e) = listener.task.await {
                error!(
                    socket = %self.id,
                    endpoint = %listener.endpoint,
                    error = %e,
                    "Listener task failed during close"
                );
            }
        }
        self.registry.detach(self.id);
        info!(socket = %self.id, "Socket closed");
    }
}

impl<T: StreamTransport> Drop for MessagingSocket<T> {
    /// Dropping without `close()` still releases the registry slot (detach is
    /// synchronous and idempotent, so this is a no-op after `close()`).
    /// Endpoint tasks shut down as their control channels close, but terminal
    /// events emitted after the drop find no registration and are discarded;
    /// `close()` remains the only path that awaits their delivery.
    ///
    /// 未经 `close()` 直接丢弃也会释放注册表槽位（detach是同步且幂等的，
    /// 因此在 `close()` 之后这是空操作）。端点任务随控制通道关闭而停止，
    /// 但丢弃之后发出的终态事件找不到注册，将被丢弃；
    /// `close()` 仍是唯一等待其送达的路径。
    fn drop(&mut self) {
        self.registry.detach(self.id);
    }
}
