//! Error taxonomy shared by every fallible operation in the engine.

/// Errors produced by the RREQ table, the source-route algebra, the wire
/// codec, and the received-RREQ processor.
///
/// Allocation failure is kept distinct from parsing/semantic failure so that
/// callers can apply the propagation policy of the spec: allocation failures
/// bubble up, parsing and semantic failures are absorbed locally into a
/// `Drop`/`Error` verdict.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DsrError {
    /// Out of memory / table at capacity with no room to evict into.
    #[error("allocation failed")]
    AllocFailed,

    /// A decoded packet or option is structurally invalid: a second RREQ
    /// option, a truncated hop list, or a source route that fails to build.
    #[error("malformed packet: {reason}")]
    MalformedPacket { reason: &'static str },

    /// `Config::validate` rejected a configuration value.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
}

pub type Result<T> = core::result::Result<T, DsrError>;
