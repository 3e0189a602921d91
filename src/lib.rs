//! Dynamic Source Routing engine: route discovery, source-route algebra,
//! and the RREQ wire codec for a multi-hop wireless ad-hoc network.
//!
//! The crate is organized the way the reference implementation separates
//! concerns — a pure value layer (addresses, source routes, the generic
//! ordered table), a wire codec, the RREQ discovery state machine, and a
//! processing pipeline — composed behind one [`engine::Engine`] façade that
//! is generic over a [`host::Host`] supplying everything deployment-specific
//! (packet I/O, link cache, neighbor table, clock, randomness).

pub mod addr;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod processor;
pub mod rreq_table;
pub mod srt;
pub mod table;
pub mod time;
pub mod wire;

pub use addr::Address;
pub use config::Config;
pub use engine::Engine;
pub use error::{DsrError, Result};
pub use host::Host;
pub use processor::Verdict;
pub use srt::SourceRoute;
