//! Scenario tests for the RREQ discovery state machine and the
//! received-RREQ processor, driven against an in-memory `Host` double with
//! a manually advanced clock — the same split the reference stack uses
//! between its inline unit tests and its `tests/` integration harness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use dsr::host::{Host, LinkCache, NeighborTable, PacketIo, RrepEmitter, SendBuffer};
use dsr::time::Clock;
use dsr::wire::RreqOption;
use dsr::{Address, Config, Engine, SourceRoute, Verdict};

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .is_test(true)
            .try_init();
    });
}

#[derive(Clone)]
struct ManualClock {
    origin: Instant,
    offset_micros: Arc<AtomicU64>,
}

impl ManualClock {
    fn new() -> Self {
        Self { origin: Instant::now(), offset_micros: Arc::new(AtomicU64::new(0)) }
    }

    fn advance(&self, delta: Duration) {
        self.offset_micros.fetch_add(delta.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_micros(self.offset_micros.load(Ordering::SeqCst))
    }
}

struct NullLinkCache {
    entries: Mutex<Vec<(Address, Address, SourceRoute)>>,
}
impl NullLinkCache {
    fn new() -> Self {
        Self { entries: Mutex::new(Vec::new()) }
    }
}
impl LinkCache for NullLinkCache {
    fn add(&self, route: SourceRoute, _ttl: Duration) {
        self.entries.lock().unwrap().push((route.src, route.dst, route));
    }
    fn find(&self, from: Address, to: Address) -> Option<SourceRoute> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(src, dst, _)| *src == from && *dst == to)
            .map(|(_, _, route)| route.clone())
    }
}

struct NullNeighborTable;
impl NeighborTable for NullNeighborTable {
    fn add(&self, _addr: Address) {}
}

struct NullSendBuffer;
impl SendBuffer for NullSendBuffer {
    fn notify_route_found(&self, _dst: Address) {}
}

#[derive(Default)]
struct RecordingRrep {
    sent: Mutex<Vec<(SourceRoute, SourceRoute)>>,
}
impl RrepEmitter for RecordingRrep {
    fn send(&self, route_to_initiator: SourceRoute, route_to_target: SourceRoute) {
        self.sent.lock().unwrap().push((route_to_initiator, route_to_target));
    }
}

#[derive(Default)]
struct RecordingPacketIo {
    broadcasts: Mutex<Vec<(Address, u16, u8)>>,
    forwards: Mutex<Vec<(Address, u16, Vec<Address>)>>,
}
impl PacketIo for RecordingPacketIo {
    fn broadcast_rreq(&self, target: Address, id: u16, ttl: u8, _jitter: Duration) {
        self.broadcasts.lock().unwrap().push((target, id, ttl));
    }
    fn forward_rreq(&self, target: Address, id: u16, hops: &[Address]) {
        self.forwards.lock().unwrap().push((target, id, hops.to_vec()));
    }
}

struct TestHost {
    addr: Address,
    clock: ManualClock,
    link_cache: NullLinkCache,
    neighbors: NullNeighborTable,
    send_buf: NullSendBuffer,
    rrep: RecordingRrep,
    packet_io: RecordingPacketIo,
}

impl TestHost {
    fn new(addr: u32, clock: ManualClock) -> Self {
        Self {
            addr: Address::new(addr),
            clock,
            link_cache: NullLinkCache::new(),
            neighbors: NullNeighborTable,
            send_buf: NullSendBuffer,
            rrep: RecordingRrep::default(),
            packet_io: RecordingPacketIo::default(),
        }
    }
}

impl Host for TestHost {
    type Clock = ManualClock;
    type LinkCache = NullLinkCache;
    type NeighborTable = NullNeighborTable;
    type SendBuffer = NullSendBuffer;
    type RrepEmitter = RecordingRrep;
    type PacketIo = RecordingPacketIo;

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }
    fn link_cache(&self) -> &Self::LinkCache {
        &self.link_cache
    }
    fn neighbor_table(&self) -> &Self::NeighborTable {
        &self.neighbors
    }
    fn send_buffer(&self) -> &Self::SendBuffer {
        &self.send_buf
    }
    fn rrep(&self) -> &Self::RrepEmitter {
        &self.rrep
    }
    fn packet_io(&self) -> &Self::PacketIo {
        &self.packet_io
    }
    fn local_address(&self) -> Address {
        self.addr
    }
    fn random_u32(&self) -> u32 {
        0xC0FF_EE11
    }
}

// Scenario 1: basic discovery, then cancellation stops further retransmits.
#[tokio::test]
async fn basic_discovery_then_cancel() {
    setup();
    let host = TestHost::new(1, ManualClock::new());
    let engine = Engine::new(Config::default(), host).unwrap();

    engine.start_discovery(Address::new(99)).await;
    assert_eq!(engine.table_len().await, 1);

    assert!(engine.cancel_discovery(Address::new(99)).await);
    // The row persists (now idle); cancelling it again is a no-op but the
    // row is still found.
    assert!(engine.cancel_discovery(Address::new(99)).await);
    // An address with no row at all reports no cancellation.
    assert!(!engine.cancel_discovery(Address::new(12345)).await);
}

// Scenario 2: exponential backoff runs to exhaustion and the row idles.
#[tokio::test(start_paused = true)]
async fn backoff_runs_to_exhaustion() {
    setup();
    let clock = ManualClock::new();
    let mut config = Config::default();
    config.max_request_rexmt = 2;
    let host = TestHost::new(1, clock.clone());
    let engine = Engine::new(config, host).unwrap();

    engine.start_discovery(Address::new(7)).await;

    for _ in 0..4 {
        tokio::time::advance(Duration::from_secs(20)).await;
        tokio::task::yield_now().await;
    }

    // One row remains (idled, not evicted); no user-visible signal beyond
    // that — matches §7's DiscoveryExhausted note.
    assert_eq!(engine.table_len().await, 1);
}

// Scenario 3: the same (initiator, target, id) triple is suppressed.
#[tokio::test]
async fn duplicate_rreq_is_suppressed() {
    setup();
    let host = TestHost::new(1, ManualClock::new());
    let engine = Engine::new(Config::default(), host).unwrap();

    let opt = RreqOption::new(5, Address::new(42));
    let first = engine.receive_rreq(Address::new(2), &[opt.clone()]).await;
    let second = engine.receive_rreq(Address::new(2), &[opt]).await;

    assert_eq!(first, Verdict::ForwardRreq);
    assert_eq!(second, Verdict::Drop);
}

// Scenario 4: our own address already in the hop list means a loop — drop.
#[tokio::test]
async fn self_in_hop_list_drops() {
    setup();
    let host = TestHost::new(1, ManualClock::new());
    let engine = Engine::new(Config::default(), host).unwrap();

    let mut opt = RreqOption::new(1, Address::new(42));
    opt.append_local_address(Address::new(1)); // loop: we're already in the path

    let verdict = engine.receive_rreq(Address::new(2), &[opt]).await;
    assert_eq!(verdict, Verdict::Drop);
}

// Scenario 5: a cached suffix to the target lets us answer without
// forwarding, provided the concatenated route has no repeated address.
#[tokio::test]
async fn cached_suffix_short_circuits_reply() {
    setup();
    let host = TestHost::new(1, ManualClock::new());
    // Seed the cache with a route from us (1) to the target (42) via 7.
    host.link_cache.add(
        SourceRoute::new(Address::new(1), Address::new(42), vec![Address::new(7)]),
        Duration::from_secs(300),
    );
    let engine = Engine::new(Config::default(), host).unwrap();

    let opt = RreqOption::new(1, Address::new(42));
    let verdict = engine.receive_rreq(Address::new(2), &[opt]).await;

    assert_eq!(verdict, Verdict::None);
    assert_eq!(engine.table_len().await, 1);
}

// Scenario 6: no cache hit, no loop, not for us — append ourselves and
// forward.
#[tokio::test]
async fn forwards_with_local_address_appended() {
    setup();
    let host = TestHost::new(1, ManualClock::new());
    let engine = Engine::new(Config::default(), host).unwrap();

    let opt = RreqOption::new(9, Address::new(42));
    let verdict = engine.receive_rreq(Address::new(2), &[opt]).await;

    assert_eq!(verdict, Verdict::ForwardRreq);
}
