//! Host capability traits (§4.10 C10).
//!
//! The engine is generic over a `Host` bundling the external collaborators
//! described as "consumed interfaces" in §6: the link cache, neighbor
//! table, send buffer, RREP emitter, and packet transmitter. Each is a
//! narrow trait so a kernel-module host and an in-memory test double can
//! both implement `Host` without either pulling in the other's concerns —
//! the same seam the reference stack draws between `Transport` and the
//! concrete `Iface`/channel implementations it is generic over.
//!
use crate::addr::Address;
use crate::srt::SourceRoute;

/// Insert and look up cached routes. `add` seeds the cache opportunistically
/// (reverse routes learned while processing an RREQ); `find` answers the
/// short-circuit cached-RREP path in the receiver.
pub trait LinkCache: Send + Sync {
    fn add(&self, route: SourceRoute, ttl: std::time::Duration);
    fn find(&self, from: Address, to: Address) -> Option<SourceRoute>;
}

/// Records a link-layer binding learned from an incoming packet's previous
/// hop.
pub trait NeighborTable: Send + Sync {
    fn add(&self, addr: Address);
}

/// Releases packets that were buffered awaiting a route to `dst`.
pub trait SendBuffer: Send + Sync {
    fn notify_route_found(&self, dst: Address);
}

/// Emits a route reply once a target (or a cached suffix to it) has been
/// found.
pub trait RrepEmitter: Send + Sync {
    fn send(&self, route_to_initiator: SourceRoute, route_to_target: SourceRoute);
}

/// Broadcasts (a fresh discovery attempt) or forwards (an in-transit RREQ
/// gaining a hop) an RREQ option. `jitter` is the upper bound the host
/// should apply before a broadcast actually goes out, per `BroadCastJitter`
/// — TTL/IP-header bookkeeping for a forward is the packet-assembly layer's
/// concern and is not modeled here.
pub trait PacketIo: Send + Sync {
    fn broadcast_rreq(&self, target: Address, id: u16, ttl: u8, jitter: std::time::Duration);
    fn forward_rreq(&self, target: Address, id: u16, hops: &[Address]);
}

/// Everything a deployment must supply for the engine to run: time, packet
/// I/O, and the route/neighbor/send-buffer/RREP collaborators of §6.
pub trait Host: Send + Sync + 'static {
    type Clock: crate::time::Clock + 'static;
    type LinkCache: LinkCache;
    type NeighborTable: NeighborTable;
    type SendBuffer: SendBuffer;
    type RrepEmitter: RrepEmitter;
    type PacketIo: PacketIo;

    fn clock(&self) -> &Self::Clock;
    fn link_cache(&self) -> &Self::LinkCache;
    fn neighbor_table(&self) -> &Self::NeighborTable;
    fn send_buffer(&self) -> &Self::SendBuffer;
    fn rrep(&self) -> &Self::RrepEmitter;
    fn packet_io(&self) -> &Self::PacketIo;

    /// The address this host is configured as, used to detect "RREQ for me"
    /// and self-origination loops.
    fn local_address(&self) -> Address;

    /// A fresh 32-bit random value, used once at construction to seed the
    /// outgoing-RREQ sequence counter.
    fn random_u32(&self) -> u32;
}
