// ── Core error types ──
//
// Domain-level failures on top of `omada_api::Error`. A table build is
// all-or-nothing: inconsistent controller data aborts the refresh cycle
// instead of producing a partially-populated table.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Controller call failed (session, transport, or API error).
    #[error(transparent)]
    Api(#[from] omada_api::Error),

    /// A reservation references a network id absent from the network
    /// listing. The table cannot be trusted; the refresh cycle fails.
    #[error("Reservation {mac} references unknown network '{net_id}'")]
    MissingNetwork { net_id: String, mac: String },

    /// A reservation carries an address that does not parse as IPv4.
    #[error("Reservation {mac} has unparsable address '{value}'")]
    InvalidAddress { value: String, mac: String },

    /// A paged read reported more rows than one page returned. Multi-page
    /// aggregation is not implemented; this surfaces loudly instead of
    /// silently serving a partial table.
    #[error("Paged read of {what} truncated: got {fetched} of {total} rows")]
    PageOverflow {
        what: &'static str,
        total: u64,
        fetched: u64,
    },
}
