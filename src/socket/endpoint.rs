//! 端点URI的解析：`scheme://host:port`。
//! Endpoint URI parsing: `scheme://host:port`.

use crate::error::{Error, Result};
use std::net::SocketAddr;

/// A parsed transport endpoint address.
///
/// The original URI string is kept verbatim: observers compare event addresses
/// against the exact string they configured at bind/connect time.
///
/// 解析后的传输端点地址。
///
/// 原始URI字符串被原样保留：观察者将事件地址与其在bind/connect时
/// 配置的字符串做精确比较。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    uri: String,
    addr: SocketAddr,
}

impl Endpoint {
    /// Parses a `tcp://host:port` endpoint URI.
    /// 解析 `tcp://host:port` 形式的端点URI。
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("tcp://")
            .ok_or_else(|| Error::UnsupportedScheme(uri.to_string()))?;
        let addr: SocketAddr = rest.parse()?;
        Ok(Self {
            uri: uri.to_string(),
            addr,
        })
    }

    /// The URI exactly as configured.
    /// 与配置完全一致的URI。
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The resolved socket address.
    /// 解析得到的套接字地址。
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
