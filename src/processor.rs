//! Received-RREQ processing pipeline (§4.6 C7).
//!
//! Mirrors `dsr_rreq_opt_recv` step for step: duplicate suppression against
//! C6, reverse-route extraction via C3, opportunistic link-cache seeding,
//! buffered-packet release, then one of three outcomes — answer directly
//! (we are the target), answer from cache (a cached suffix exists and the
//! concatenated route has no repeats), or append ourselves and forward.
//! Self-origination and loop checks happen before the cache lookup, exactly
//! as in the reference order.

use log::trace;

use crate::addr::Address;
use crate::config::Config;
use crate::host::Host;
use crate::rreq_table::{Retransmit, RreqTable};
use crate::srt::SourceRoute;
use crate::time::Clock;
use crate::wire::RreqOption;

/// The disposition the caller (typically the packet-I/O loop) should apply
/// to the packet that carried this RREQ option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Fully handled here (answered, or answered from cache); nothing more
    /// to do.
    None,
    /// Expected, silent discard: duplicate, loop, or self-origination.
    Drop,
    /// Malformed packet; the I/O layer should drop it too, but the
    /// condition is logged as an error rather than a routine drop.
    Error,
    /// Append our address and re-broadcast; the caller owns TTL/IP-header
    /// bookkeeping for the forwarded copy.
    ForwardRreq,
}

/// Processes one already-decoded RREQ option received from `pkt_src`.
/// Callers are responsible for rejecting packets that carry more than one
/// RREQ option before reaching this function (`Verdict::Error` in that
/// case, per §4.6).
pub async fn receive_rreq<C, R, H>(
    rreq_table: &RreqTable<C, R>,
    config: &Config,
    host: &H,
    pkt_src: Address,
    opt: &RreqOption,
) -> Verdict
where
    C: Clock + 'static,
    R: Retransmit,
    H: Host,
{
    let target = opt.target;

    if rreq_table.duplicate(pkt_src, target, opt.id).await {
        trace!("duplicate RREQ src={pkt_src} target={target} id={}", opt.id);
        return Verdict::Drop;
    }
    rreq_table.record_received(pkt_src, target, opt.id).await;

    let myaddr = host.local_address();
    let srt = SourceRoute::new(pkt_src, myaddr, opt.hops.clone());
    let srt_rev = srt.reverse();

    host.link_cache().add(srt_rev.clone(), config.route_cache_timeout);

    let prev_hop =
        if !srt_rev.hops.is_empty() { srt_rev.hops[0] } else { srt_rev.dst };
    host.neighbor_table().add(prev_hop);
    host.send_buffer().notify_route_found(srt_rev.dst);

    if target == myaddr {
        trace!("RREQ target=myaddr src={pkt_src} id={}, answering", opt.id);
        host.rrep().send(srt_rev, srt);
        return Verdict::None;
    }

    if srt.src == myaddr {
        trace!("RREQ self-origination src={pkt_src} id={}", opt.id);
        return Verdict::Drop;
    }
    if srt.hops.iter().any(|&hop| hop == myaddr) {
        trace!("RREQ loop: myaddr already in hop list, src={pkt_src} id={}", opt.id);
        return Verdict::Drop;
    }

    if let Some(cached) = host.link_cache().find(myaddr, target) {
        let concatenated = srt.concatenate(&cached);
        if !concatenated.check_duplicate() {
            trace!("answering RREQ from cache src={pkt_src} target={target}");
            host.rrep().send(srt_rev, concatenated);
            return Verdict::None;
        }
        trace!("cached route to {target} has a duplicate address, forwarding instead");
    }

    let mut forwarded = opt.clone();
    forwarded.append_local_address(myaddr);
    host.packet_io().forward_rreq(target, opt.id, &forwarded.hops);
    Verdict::ForwardRreq
}
