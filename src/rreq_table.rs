//! RREQ origin table and discovery state machine (§4.4 C5, §4.5 C6).
//!
//! One row per destination we are or were discovering a route to. Each row
//! owns a private FIFO of `(target, id)` pairs already seen from that
//! initiator — the per-entry instance of the generic [`OrderedTable`] used
//! for duplicate suppression (C6). The whole-table LRU behavior (evict the
//! oldest row when a new one is needed and the table is full) and the
//! per-row exponential-backoff retransmit schedule both mirror
//! `rreq_tbl_timeout`/`__rreq_tbl_add`/`rreq_tbl_add_id` in the reference
//! implementation.
//!
//! Scheduling goes through real `tokio::time`, not the injectable [`Clock`]:
//! `last_used`/`tx_time` bookkeeping uses `Clock` so tests can assert on
//! deterministic timestamps, while the actual retransmit wakeups use
//! `tokio::time::sleep`, which a `#[tokio::test(start_paused = true)]` can
//! fast-forward with `tokio::time::advance`. This keeps the table free of a
//! bespoke timer abstraction, matching how the reference stack's own
//! transport handler schedules retransmits with plain `tokio::time` rather
//! than a host-supplied timer trait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::addr::Address;
use crate::config::Config;
use crate::table::OrderedTable;
use crate::time::Clock;

const TTL_START: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Idle,
    InRouteDiscovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdEntry {
    pub target: Address,
    pub id: u16,
}

struct RreqEntry {
    node_addr: Address,
    state: DiscoveryState,
    ttl: u8,
    timeout: Duration,
    num_rexmts: u32,
    last_used: Instant,
    seen_ids: OrderedTable<IdEntry>,
    generation: u64,
    cancel: CancellationToken,
}

/// Host callback invoked when a timer fires and an RREQ must go out again
/// (initial send or exponential-backoff retransmit).
pub trait Retransmit: Send + Sync + 'static {
    fn retransmit(&self, target: Address, ttl: u8);
}

struct Inner<C: Clock, R: Retransmit> {
    table: RwLock<OrderedTable<RreqEntry>>,
    config: Config,
    clock: C,
    retransmit: R,
    next_generation: AtomicU64,
}

/// The RREQ table (§4.4), cheaply cloneable: clones share the same
/// underlying state, the same way a reference-counted transport handle is
/// passed into each spawned timer task in the reference stack.
pub struct RreqTable<C: Clock, R: Retransmit> {
    inner: Arc<Inner<C, R>>,
}

impl<C: Clock, R: Retransmit> Clone for RreqTable<C, R> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Clock + 'static, R: Retransmit> RreqTable<C, R> {
    pub fn new(config: Config, clock: C, retransmit: R) -> Self {
        let max_len = config.rreq_tbl_max_len;
        Self {
            inner: Arc::new(Inner {
                table: RwLock::new(OrderedTable::new(max_len)),
                config,
                clock,
                retransmit,
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    fn next_generation(&self) -> u64 {
        self.inner.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    fn evict_if_full(&self, table: &mut OrderedTable<RreqEntry>) {
        if table.full() {
            if let Some(evicted) = table.del_first() {
                evicted.cancel.cancel();
            }
        }
    }

    /// Starts (or, if already in progress, no-ops on) a route discovery for
    /// `target`. Returns the TTL the caller should place on the outgoing
    /// RREQ, which is always [`TTL_START`] for a freshly started discovery.
    pub async fn start_discovery(&self, target: Address) -> u8 {
        let mut table = self.inner.table.write().await;

        let existing = table.find_detach(|e| e.node_addr == target);
        if let Some(entry) = existing {
            if entry.state == DiscoveryState::InRouteDiscovery {
                let ttl = entry.ttl;
                table.add_tail(entry);
                return ttl;
            }
            // Reuse the row (and its seen_ids) but restart the timer.
            let now = self.inner.clock.now();
            let timeout = self.inner.config.nonprop_request_timeout;
            let generation = self.next_generation();
            let cancel = CancellationToken::new();
            let mut entry = entry;
            entry.state = DiscoveryState::InRouteDiscovery;
            entry.ttl = TTL_START;
            entry.timeout = timeout;
            entry.num_rexmts = 0;
            entry.last_used = now;
            entry.generation = generation;
            entry.cancel = cancel.clone();
            table.add_tail(entry);
            drop(table);
            self.spawn_timer(target, generation, cancel, timeout);
            self.inner.retransmit.retransmit(target, TTL_START);
            return TTL_START;
        }

        self.evict_if_full(&mut table);

        let now = self.inner.clock.now();
        let timeout = self.inner.config.nonprop_request_timeout;
        let generation = self.next_generation();
        let cancel = CancellationToken::new();
        table.add_tail(RreqEntry {
            node_addr: target,
            state: DiscoveryState::InRouteDiscovery,
            ttl: TTL_START,
            timeout,
            num_rexmts: 0,
            last_used: now,
            seen_ids: OrderedTable::new(self.inner.config.request_table_ids),
            generation,
            cancel: cancel.clone(),
        });
        drop(table);

        self.spawn_timer(target, generation, cancel, timeout);
        self.inner.retransmit.retransmit(target, TTL_START);
        TTL_START
    }

    /// Cancels an in-progress discovery for `dst`. Disarms the timer
    /// synchronously with respect to the handler: once this returns, the
    /// row's generation is stale, and a timer that was already mid-fire
    /// finds no matching generation and performs no action.
    pub async fn cancel_discovery(&self, dst: Address) -> bool {
        let mut table = self.inner.table.write().await;
        let Some(mut entry) = table.find_detach(|e| e.node_addr == dst) else {
            return false;
        };
        if entry.state == DiscoveryState::InRouteDiscovery {
            entry.cancel.cancel();
            // Bump the generation too: a timer that already slept past the
            // `select!` and is now blocked on the table write lock in
            // `fire_timeout` would otherwise still match on `node_addr` and
            // resend, resurrecting a cancelled discovery.
            entry.generation = self.next_generation();
        }
        entry.state = DiscoveryState::Idle;
        entry.last_used = self.inner.clock.now();
        table.add_tail(entry);
        true
    }

    /// Records that `(target, id)` was just received from `initiator`,
    /// creating the initiator's row if needed (evicting the table's oldest
    /// row first if full). Mirrors `rreq_tbl_add_id`.
    pub async fn record_received(&self, initiator: Address, target: Address, id: u16) {
        let mut table = self.inner.table.write().await;
        let mut entry = match table.find_detach(|e| e.node_addr == initiator) {
            Some(e) => e,
            None => {
                self.evict_if_full(&mut table);
                RreqEntry {
                    node_addr: initiator,
                    state: DiscoveryState::Idle,
                    ttl: 0,
                    timeout: Duration::ZERO,
                    num_rexmts: 0,
                    last_used: self.inner.clock.now(),
                    seen_ids: OrderedTable::new(self.inner.config.request_table_ids),
                    generation: self.next_generation(),
                    cancel: CancellationToken::new(),
                }
            }
        };

        entry.last_used = self.inner.clock.now();
        if entry.seen_ids.full() {
            entry.seen_ids.del_first();
        }
        entry.seen_ids.add_tail(IdEntry { target, id });
        table.add_tail(entry);
    }

    /// `true` iff `(initiator, target, id)` has already been recorded.
    pub async fn duplicate(&self, initiator: Address, target: Address, id: u16) -> bool {
        let table = self.inner.table.read().await;
        table
            .find(|e| e.node_addr == initiator)
            .map(|e| e.seen_ids.find(|seen| seen.target == target && seen.id == id).is_some())
            .unwrap_or(false)
    }

    fn spawn_timer(&self, addr: Address, generation: u64, cancel: CancellationToken, delay: Duration) {
        let table = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    table.fire_timeout(addr, generation).await;
                }
            }
        });
    }

    /// The backoff/retransmit step driven by timer expiry. Mirrors
    /// `rreq_tbl_timeout`: doubles `timeout` and `ttl` (capped at
    /// `MaxRequestPeriod` and `MAXTTL`), resends, and reschedules, unless
    /// `MaxRequestRexmt` attempts have already been made, in which case the
    /// row goes back to `Idle` with no further signal to the caller.
    async fn fire_timeout(&self, addr: Address, generation: u64) {
        let mut table = self.inner.table.write().await;
        let Some(mut entry) = table.find_detach(|e| e.node_addr == addr && e.generation == generation)
        else {
            return;
        };

        if entry.num_rexmts >= self.inner.config.max_request_rexmt {
            entry.state = DiscoveryState::Idle;
            table.add_tail(entry);
            return;
        }

        entry.num_rexmts += 1;
        entry.timeout = (entry.timeout * 2).min(self.inner.config.max_request_period);
        entry.ttl = entry.ttl.saturating_mul(2).min(crate::config::MAXTTL);
        entry.last_used = self.inner.clock.now();

        let ttl = entry.ttl;
        let timeout = entry.timeout;
        let cancel = CancellationToken::new();
        entry.cancel = cancel.clone();
        table.add_tail(entry);
        drop(table);

        self.spawn_timer(addr, generation, cancel, timeout);
        self.inner.retransmit.retransmit(addr, ttl);
    }

    pub async fn len(&self) -> usize {
        self.inner.table.read().await.len()
    }
}
