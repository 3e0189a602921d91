//! Engine façade (§4.11 C11).
//!
//! `Engine<H>` is the single entry point a host integration talks to: it
//! owns the RREQ table (C5/C6), the process-wide outgoing-sequence counter,
//! and the `Host` the rest of the crate is generic over. It replaces the
//! reference implementation's module-level globals (`rreq_tbl`,
//! `rreq_seqno`) with one constructible, first-class value, the same shift
//! the reference stack itself makes with its `Transport` struct in place of
//! a kernel module's static state.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::info;

use crate::addr::Address;
use crate::config::Config;
use crate::error::Result;
use crate::host::{Host, PacketIo};
use crate::processor::{self, Verdict};
use crate::rreq_table::{Retransmit, RreqTable};
use crate::wire::RreqOption;

struct HostRetransmit<H: Host> {
    host: Arc<H>,
    seqno: Arc<AtomicU32>,
    jitter: std::time::Duration,
}

impl<H: Host> Retransmit for HostRetransmit<H> {
    fn retransmit(&self, target: Address, ttl: u8) {
        let id = self.seqno.fetch_add(1, Ordering::Relaxed) as u16;
        self.host.packet_io().broadcast_rreq(target, id, ttl, self.jitter);
    }
}

/// The engine, generic over a `Host` implementation. Cheaply cloneable: all
/// state is reference-counted, matching [`RreqTable`]'s own clone semantics.
pub struct Engine<H: Host> {
    host: Arc<H>,
    config: Config,
    table: RreqTable<H::Clock, HostRetransmit<H>>,
    seqno: Arc<AtomicU32>,
}

impl<H: Host> Clone for Engine<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            config: self.config.clone(),
            table: self.table.clone(),
            seqno: Arc::clone(&self.seqno),
        }
    }
}

impl<H: Host> Engine<H>
where
    H::Clock: Clone,
{
    /// Builds a new engine. `host.clock()` is cloned into the table (the
    /// table needs an owned clock to hand to its timer tasks); `validate`
    /// is run once here, per §4.9.
    pub fn new(config: Config, host: H) -> Result<Self> {
        config.validate()?;
        let host = Arc::new(host);
        let seqno = Arc::new(AtomicU32::new(host.random_u32()));
        let jitter = config.broadcast_jitter;
        let retransmit = HostRetransmit { host: Arc::clone(&host), seqno: Arc::clone(&seqno), jitter };
        let table = RreqTable::new(config.clone(), host.clock().clone(), retransmit);
        info!("DSR engine constructed, local_address={}", host.local_address());
        Ok(Self { host, config, table, seqno })
    }

    /// `start_discovery(target)`.
    pub async fn start_discovery(&self, target: Address) {
        self.table.start_discovery(target).await;
    }

    /// `cancel_discovery(dst)`.
    pub async fn cancel_discovery(&self, dst: Address) -> bool {
        self.table.cancel_discovery(dst).await
    }

    /// `receive_rreq(packet, opt)`. `opts` holds every RREQ option found
    /// while walking the packet's option chain; more than one is malformed
    /// per §4.6 step 1.
    pub async fn receive_rreq(&self, pkt_src: Address, opts: &[RreqOption]) -> Verdict {
        match opts {
            [] => Verdict::None,
            [opt] => {
                processor::receive_rreq(&self.table, &self.config, self.host.as_ref(), pkt_src, opt)
                    .await
            }
            _ => {
                log::warn!("packet carries {} RREQ options, rejecting", opts.len());
                Verdict::Error
            }
        }
    }

    /// Row count in the RREQ table, for diagnostics / `print_table`.
    pub async fn table_len(&self) -> usize {
        self.table.len().await
    }

    /// `init()`. Construction already performs the reference
    /// implementation's `rreq_tbl_init` work (seeding `rreq_seqno`,
    /// allocating the table); this exists only so host integrations have an
    /// explicit lifecycle hook to call, matching §6.
    pub fn init(&self) {
        info!("DSR engine init");
    }

    /// `cleanup()`. Dropping the last `Engine` clone already drops the
    /// table and cancels any still-armed timers (each timer task holds only
    /// a [`RreqTable`] clone, not a standalone handle); this is the
    /// explicit counterpart for hosts that want a synchronous teardown
    /// point.
    pub fn cleanup(&self) {
        info!("DSR engine cleanup");
    }

    /// `print_table(buf)`: a plain `Display`-able snapshot rather than a
    /// caller-supplied buffer, since Rust has no equivalent need for a
    /// preallocated `/proc` page.
    pub async fn print_table(&self) -> String {
        format!("rreq table rows: {}", self.table.len().await)
    }

    #[cfg(test)]
    pub(crate) fn seqno_for_test(&self) -> u32 {
        self.seqno.load(Ordering::Relaxed)
    }
}
