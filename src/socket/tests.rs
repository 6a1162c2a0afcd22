//! Unit tests for endpoint parsing, framing, and facade behaviors.

use super::{endpoint::Endpoint, framing, handle::MessagingSocket, transport::TcpTransport};
use crate::{config::Config, error::Error, monitor::MonitorRegistry, testing::EventRecorder};
use bytes::Bytes;
use std::sync::Arc;

#[test]
fn test_endpoint_parse_keeps_uri_verbatim() {
    let endpoint = Endpoint::parse("tcp://127.0.0.1:5560").unwrap();
    assert_eq!(endpoint.uri(), "tcp://127.0.0.1:5560");
    assert_eq!(endpoint.addr().port(), 5560);
    assert!(endpoint.addr().ip().is_loopback());
}

#[test]
fn test_endpoint_parse_rejects_unknown_scheme() {
    let result = Endpoint::parse("ipc:///tmp/sock");
    assert!(matches!(result, Err(Error::UnsupportedScheme(_))));

    let result = Endpoint::parse("127.0.0.1:5560");
    assert!(matches!(result, Err(Error::UnsupportedScheme(_))));
}

#[test]
fn test_endpoint_parse_rejects_bad_address() {
    let result = Endpoint::parse("tcp://not-an-address");
    assert!(matches!(result, Err(Error::AddressParse(_))));
}

#[tokio::test]
async fn test_framing_round_trip() {
    let (mut client, mut server) = tokio::io::duplex(1024);

    let payload = Bytes::from_static(b"hello");
    framing::write_frame(&mut client, &payload, 1024).await.unwrap();

    let received = framing::read_frame(&mut server, 1024).await.unwrap();
    assert_eq!(received, Some(payload));
}

#[tokio::test]
async fn test_framing_empty_payload() {
    let (mut client, mut server) = tokio::io::duplex(64);

    framing::write_frame(&mut client, &Bytes::new(), 64).await.unwrap();
    let received = framing::read_frame(&mut server, 64).await.unwrap();
    assert_eq!(received, Some(Bytes::new()));
}

#[tokio::test]
async fn test_framing_clean_eof_reads_as_none() {
    let (client, mut server) = tokio::io::duplex(64);
    drop(client);

    let received = framing::read_frame(&mut server, 64).await.unwrap();
    assert_eq!(received, None);
}

#[tokio::test]
async fn test_framing_rejects_oversized_frame() {
    let (mut client, mut server) = tokio::io::duplex(1024);

    let payload = Bytes::from(vec![0u8; 512]);
    framing::write_frame(&mut client, &payload, 1024).await.unwrap();

    let result = framing::read_frame(&mut server, 16).await;
    assert!(matches!(result, Err(Error::FrameTooLarge)));
}

#[tokio::test]
async fn test_framing_rejects_oversized_write() {
    let (mut client, mut server) = tokio::io::duplex(1024);

    // 超限的帧在触碰线路之前就被本地拒绝
    // An over-limit frame is rejected locally before touching the wire
    let payload = Bytes::from(vec![0u8; 512]);
    let result = framing::write_frame(&mut client, &payload, 16).await;
    assert!(matches!(result, Err(Error::FrameTooLarge)));

    // The stream stays usable: a conforming frame still round-trips.
    // 流保持可用：符合限制的帧仍能正常往返。
    let payload = Bytes::from_static(b"ok");
    framing::write_frame(&mut client, &payload, 16).await.unwrap();
    let received = framing::read_frame(&mut server, 16).await.unwrap();
    assert_eq!(received, Some(payload));
}

#[test]
fn test_drop_detaches_socket_from_registry() {
    let registry = Arc::new(MonitorRegistry::new());
    let config = Arc::new(Config::default());

    let socket = MessagingSocket::<TcpTransport>::new(registry.clone(), config);
    let id = socket.id();
    drop(socket);

    // 未经close()丢弃的套接字不得在注册表中留下槽位
    // A socket dropped without close() must not leave a slot in the registry
    let recorder = EventRecorder::new();
    let result = registry.register(id, recorder.callback());
    assert!(matches!(result, Err(Error::UnknownSocket(rejected)) if rejected == id));
}

#[tokio::test]
async fn test_framing_eof_inside_frame_is_an_error() {
    let (mut client, mut server) = tokio::io::duplex(64);

    // Length prefix promises 8 bytes but only 2 arrive before EOF.
    // 长度前缀声明8字节，但EOF前只到达2字节。
    use tokio::io::AsyncWriteExt;
    client.write_all(&8u32.to_be_bytes()).await.unwrap();
    client.write_all(b"ab").await.unwrap();
    drop(client);

    let result = framing::read_frame(&mut server, 64).await;
    assert!(matches!(result, Err(Error::Io(_))));
}
