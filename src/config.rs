//! 定义了套接字和监控行为的可配置参数。
//! Defines configurable parameters for socket and monitoring behavior.

use std::time::Duration;

/// A structure containing all configurable parameters for a messaging socket.
///
/// 包含消息套接字所有可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct Config {
    /// Connect-retry-related parameters.
    /// 连接重试相关参数。
    pub connect: ConnectConfig,

    /// Transport and framing-related parameters.
    /// 传输和帧相关参数。
    pub transport: TransportConfig,
}

/// Connect-retry-related parameters.
///
/// 连接重试相关参数。
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// The base interval between connection attempts while the target is not
    /// yet reachable. Each failed attempt surfaces as a `ConnectDelayed` event.
    /// 目标尚不可达时两次连接尝试之间的基础间隔。
    /// 每次失败的尝试都会以 `ConnectDelayed` 事件的形式上报。
    pub retry_interval: Duration,
    /// The maximum random jitter added to each retry interval to avoid
    /// reconnect storms from many endpoints at once.
    /// 为每个重试间隔增加的最大随机抖动，避免大量端点同时重连。
    pub retry_jitter: Duration,
    /// The number of failed attempts after which the connector gives up.
    /// 连接器放弃之前允许的失败尝试次数。
    pub max_retries: u32,
}

/// Transport and framing-related parameters.
///
/// 传输和帧相关参数。
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// The maximum payload size of a single request/reply frame.
    /// 单个请求/应答帧的最大载荷大小。
    pub max_frame_size: usize,
    /// How long the accept loop backs off after a transient accept failure.
    /// accept循环在一次瞬时accept失败后的退避时长。
    pub accept_error_backoff: Duration,
    /// The capacity of the command channel between a socket handle and each
    /// of its endpoint tasks.
    /// 套接字句柄与其每个端点任务之间命令通道的容量。
    pub command_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect: ConnectConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(100),
            retry_jitter: Duration::from_millis(20),
            max_retries: 100,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_size: 64 * 1024,
            accept_error_backoff: Duration::from_millis(50),
            command_queue_capacity: 16,
        }
    }
}
