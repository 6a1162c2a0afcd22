//! End-to-end monitor tests: drive messaging sockets through bind, connect,
//! bounce traffic, and close, and assert that registered observers see the
//! lifecycle event sequences with correctly populated metadata.

use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use bytes::Bytes;
use kestrel_monitor::config::Config;
use kestrel_monitor::error::Error;
use kestrel_monitor::event::{EventKind, SocketEvent};
use kestrel_monitor::monitor::MonitorRegistry;
use kestrel_monitor::socket::{MessagingSocket, TcpTransport};
use kestrel_monitor::testing::EventRecorder;
use tokio::time::timeout;

/// Helper to initialize tracing for tests.
fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .init();
    });
}

fn setup() -> (Arc<MonitorRegistry>, Arc<Config>) {
    init_tracing();
    (Arc::new(MonitorRegistry::new()), Arc::new(Config::default()))
}

/// Checks the per-kind payload contract: address always present, descriptor
/// only for I/O-bearing kinds, nonzero error code only for failure kinds.
fn assert_payload_contract(event: &SocketEvent, expected_addr: &str) {
    assert_eq!(event.endpoint(), expected_addr, "address must match verbatim");
    match event.kind() {
        EventKind::Listening | EventKind::Accepted | EventKind::Connected => {
            assert!(event.descriptor().is_some_and(|fd| fd > 0));
            assert!(event.error_code().is_none());
        }
        EventKind::Closed | EventKind::Disconnected => {
            assert!(event.descriptor().is_some_and(|fd| fd != 0));
            assert!(event.error_code().is_none());
        }
        EventKind::ConnectDelayed | EventKind::CloseFailed => {
            assert!(event.descriptor().is_none());
            assert!(event.error_code().is_some_and(|err| err != 0));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_monitor_lifecycle() {
    let (registry, config) = setup();
    const ADDR: &str = "tcp://127.0.0.1:5560";

    let mut rep = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let mut req = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());

    let rep_recorder = EventRecorder::new();
    let req_recorder = EventRecorder::new();
    rep.monitor(Some(rep_recorder.callback())).unwrap();
    req.monitor(Some(req_recorder.callback())).unwrap();

    // Bind the reply side, then connect the request side to the same address.
    rep.bind(ADDR).await.unwrap();
    req.connect(ADDR).unwrap();

    timeout(
        Duration::from_secs(5),
        futures::future::join(
            req_recorder.wait_for_kind(EventKind::Connected),
            rep_recorder.wait_for_kind(EventKind::Accepted),
        ),
    )
    .await
    .expect("connection should be established and observed");

    // Bounce one request/reply exchange.
    let reply = timeout(
        Duration::from_secs(5),
        req.request(Bytes::from_static(b"bounce")),
    )
    .await
    .expect("bounce should not time out")
    .expect("bounce should succeed");
    assert_eq!(reply, Bytes::from_static(b"bounce"));

    // Close the request side first, then the reply side.
    req.close().await;
    timeout(
        Duration::from_secs(5),
        req_recorder.wait_for_kind(EventKind::Disconnected),
    )
    .await
    .expect("connector teardown should be observed");

    rep.close().await;
    timeout(
        Duration::from_secs(5),
        rep_recorder.wait_for_kind(EventKind::Closed),
    )
    .await
    .expect("listener close should be observed");

    // Per-endpoint, order-sensitive sequences.
    assert_eq!(
        rep_recorder.kinds_for(rep.id()),
        vec![EventKind::Listening, EventKind::Accepted, EventKind::Closed]
    );
    assert_eq!(
        req_recorder.kinds_for(req.id()),
        vec![EventKind::Connected, EventKind::Disconnected]
    );

    // The union of observed kinds is exactly the expected five.
    let union: std::collections::HashSet<EventKind> = rep_recorder
        .kinds()
        .into_iter()
        .chain(req_recorder.kinds())
        .collect();
    let expected: std::collections::HashSet<EventKind> = [
        EventKind::Listening,
        EventKind::Accepted,
        EventKind::Connected,
        EventKind::Closed,
        EventKind::Disconnected,
    ]
    .into_iter()
    .collect();
    assert_eq!(union, expected);

    // Every delivered event obeys the payload field table verbatim.
    for (_, event) in rep_recorder.events().iter().chain(req_recorder.events().iter()) {
        assert_payload_contract(event, ADDR);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_connect_delayed_then_connected() {
    let (registry, config) = setup();
    const ADDR: &str = "tcp://127.0.0.1:5561";

    let mut req = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let req_recorder = EventRecorder::new();
    req.monitor(Some(req_recorder.callback())).unwrap();

    // Nothing is listening yet: attempts fail and surface as ConnectDelayed.
    req.connect(ADDR).unwrap();
    timeout(
        Duration::from_secs(5),
        req_recorder.wait_for_kind(EventKind::ConnectDelayed),
    )
    .await
    .expect("a failed attempt should be observed");

    // Once the target becomes reachable a retry succeeds.
    let mut rep = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    rep.bind(ADDR).await.unwrap();
    timeout(
        Duration::from_secs(5),
        req_recorder.wait_for_kind(EventKind::Connected),
    )
    .await
    .expect("a retry should eventually connect");

    req.close().await;
    rep.close().await;

    let kinds = req_recorder.kinds();
    assert_eq!(kinds[0], EventKind::ConnectDelayed);
    assert!(kinds.contains(&EventKind::Connected));
    for (_, event) in req_recorder.events() {
        assert_payload_contract(&event, ADDR);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reregistration_supersedes_prior_observer() {
    let (registry, config) = setup();
    const ADDR: &str = "tcp://127.0.0.1:5562";

    let mut rep = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());

    let first = EventRecorder::new();
    rep.monitor(Some(first.callback())).unwrap();
    rep.bind(ADDR).await.unwrap();
    assert_eq!(first.kinds(), vec![EventKind::Listening]);

    // Re-registering atomically supersedes: no further events reach `first`.
    let second = EventRecorder::new();
    rep.monitor(Some(second.callback())).unwrap();
    rep.close().await;

    assert_eq!(first.kinds(), vec![EventKind::Listening]);
    assert_eq!(second.kinds(), vec![EventKind::Closed]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unregistered_socket_drops_events_silently() {
    let (registry, config) = setup();
    const ADDR: &str = "tcp://127.0.0.1:5563";

    let mut rep = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let recorder = EventRecorder::new();
    rep.monitor(Some(recorder.callback())).unwrap();
    rep.bind(ADDR).await.unwrap();

    // Clearing the observer drops subsequent events without erroring the
    // transport layer; clearing twice is a no-op.
    rep.monitor(None).unwrap();
    rep.monitor(None).unwrap();
    rep.close().await;

    assert_eq!(recorder.kinds(), vec![EventKind::Listening]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_graceful_disconnect_reports_closed() {
    let (registry, config) = setup();
    const ADDR: &str = "tcp://127.0.0.1:5564";

    let mut rep = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let mut req = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let req_recorder = EventRecorder::new();
    req.monitor(Some(req_recorder.callback())).unwrap();

    rep.bind(ADDR).await.unwrap();
    req.connect(ADDR).unwrap();
    timeout(
        Duration::from_secs(5),
        req_recorder.wait_for_kind(EventKind::Connected),
    )
    .await
    .expect("connection should be established");

    // An explicit local detach of the endpoint is reported as Closed, not
    // Disconnected.
    req.disconnect(ADDR).await.unwrap();
    timeout(
        Duration::from_secs(5),
        req_recorder.wait_for_kind(EventKind::Closed),
    )
    .await
    .expect("detach should be observed");

    req.close().await;
    rep.close().await;
    assert_eq!(
        req_recorder.kinds(),
        vec![EventKind::Connected, EventKind::Closed]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_oversized_request_is_rejected_locally() {
    let (registry, config) = setup();
    const ADDR: &str = "tcp://127.0.0.1:5565";

    let mut rep = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let mut req = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let req_recorder = EventRecorder::new();
    req.monitor(Some(req_recorder.callback())).unwrap();

    rep.bind(ADDR).await.unwrap();
    req.connect(ADDR).unwrap();
    timeout(
        Duration::from_secs(5),
        req_recorder.wait_for_kind(EventKind::Connected),
    )
    .await
    .expect("connection should be established");

    // A request over max_frame_size fails locally, before touching the wire.
    let oversized = Bytes::from(vec![0u8; 2 * config.transport.max_frame_size]);
    let result = req.request(oversized).await;
    assert!(matches!(result, Err(Error::FrameTooLarge)));

    // The connection survives the rejection and keeps serving exchanges.
    let reply = timeout(
        Duration::from_secs(5),
        req.request(Bytes::from_static(b"still alive")),
    )
    .await
    .expect("exchange should not time out")
    .expect("exchange should succeed");
    assert_eq!(reply, Bytes::from_static(b"still alive"));
    assert!(!req_recorder.kinds().contains(&EventKind::Disconnected));

    req.close().await;
    rep.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_request_during_backoff_does_not_shorten_retry() {
    init_tracing();
    let registry = Arc::new(MonitorRegistry::new());
    let mut config = Config::default();
    config.connect.retry_interval = Duration::from_millis(500);
    config.connect.retry_jitter = Duration::ZERO;
    let config = Arc::new(config);

    // Nothing is ever bound here: every attempt fails.
    const ADDR: &str = "tcp://127.0.0.1:5566";
    let mut req = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let recorder = EventRecorder::new();
    req.monitor(Some(recorder.callback())).unwrap();

    req.connect(ADDR).unwrap();
    timeout(
        Duration::from_secs(5),
        recorder.wait_for_kind(EventKind::ConnectDelayed),
    )
    .await
    .expect("a failed attempt should be observed");

    // A request during the backoff is refused but must not cancel the wait:
    // no further attempt may happen before the retry interval elapses.
    let result = req.request(Bytes::from_static(b"ping")).await;
    assert!(matches!(result, Err(Error::NotConnected)));

    tokio::time::sleep(Duration::from_millis(250)).await;
    let delayed = recorder
        .kinds()
        .iter()
        .filter(|kind| **kind == EventKind::ConnectDelayed)
        .count();
    assert_eq!(delayed, 1, "the retry interval must be honored");

    req.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_registration_on_closed_socket_is_rejected() {
    let (registry, config) = setup();

    let mut socket = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    let id = socket.id();
    socket.close().await;

    let recorder = EventRecorder::new();
    let result = socket.monitor(Some(recorder.callback()));
    assert!(matches!(result, Err(Error::UnknownSocket(rejected)) if rejected == id));

    // Other sockets' registrations are unaffected.
    let other = MessagingSocket::<TcpTransport>::new(registry.clone(), config.clone());
    other.monitor(Some(recorder.callback())).unwrap();
}
