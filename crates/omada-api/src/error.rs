use thiserror::Error;

/// Top-level error type for the `omada-api` crate.
///
/// Covers every failure mode of a controller call: session expiry,
/// controller-reported application errors, transport failures, and
/// response decoding. `omada-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// The controller redirected to its login page. Recoverable once per
    /// call via the automatic re-login pass; fatal if it happens again
    /// right after a fresh login.
    #[error("Session expired -- login required")]
    LoginRequired,

    /// The configured site is not visible to the authenticated account.
    #[error("Site '{name}' is not visible to this account")]
    SiteNotFound { name: String },

    // ── Controller ──────────────────────────────────────────────────
    /// Application error reported in the response envelope
    /// (`errorCode != 0`). Never retried.
    #[error("Controller API error {code}: {message}")]
    Api { code: i64, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
