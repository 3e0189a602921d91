//! Engine configuration (§4.9 C9).

use std::time::Duration;

use crate::error::{DsrError, Result};

/// Fixed per the wire format and the reference implementation; not
/// configurable.
pub const MAXTTL: u8 = 255;

/// Tunable parameters for the RREQ table and discovery backoff schedule.
/// Defaults match the reference implementation's compiled-in constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of retransmit attempts before a discovery idles.
    pub max_request_rexmt: u32,
    /// Backoff period used once `ttl > 1`.
    pub request_period: Duration,
    /// Initial (TTL == 1) retransmit timeout.
    pub nonprop_request_timeout: Duration,
    /// Ceiling the doubling backoff saturates at.
    pub max_request_period: Duration,
    /// Per-initiator `seen_ids` FIFO depth.
    pub request_table_ids: usize,
    /// Whole-table row capacity.
    pub rreq_tbl_max_len: usize,
    /// TTL applied to routes learned from a received RREQ.
    pub route_cache_timeout: Duration,
    /// Upper bound on the random jitter applied before broadcasting.
    pub broadcast_jitter: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_request_rexmt: 3,
            request_period: Duration::from_millis(500),
            nonprop_request_timeout: Duration::from_millis(30),
            max_request_period: Duration::from_secs(10),
            request_table_ids: 16,
            rreq_tbl_max_len: 64,
            route_cache_timeout: Duration::from_secs(300),
            broadcast_jitter: Duration::from_millis(10),
        }
    }
}

impl Config {
    /// Rejects configurations that would make the table or backoff schedule
    /// meaningless (zero capacity, zero timeout).
    pub fn validate(&self) -> Result<()> {
        if self.rreq_tbl_max_len == 0 {
            return Err(DsrError::InvalidConfig { reason: "rreq_tbl_max_len must be non-zero" });
        }
        if self.request_table_ids == 0 {
            return Err(DsrError::InvalidConfig { reason: "request_table_ids must be non-zero" });
        }
        if self.nonprop_request_timeout.is_zero() {
            return Err(DsrError::InvalidConfig {
                reason: "nonprop_request_timeout must be non-zero",
            });
        }
        if self.max_request_period < self.nonprop_request_timeout {
            return Err(DsrError::InvalidConfig {
                reason: "max_request_period must be >= nonprop_request_timeout",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_table_len() {
        let mut cfg = Config::default();
        cfg.rreq_tbl_max_len = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_period_ceiling() {
        let mut cfg = Config::default();
        cfg.max_request_period = Duration::from_millis(1);
        assert!(cfg.validate().is_err());
    }
}
