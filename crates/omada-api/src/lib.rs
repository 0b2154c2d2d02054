// omada-api: Async client for the Omada controller's v2 web API.

pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use error::Error;
pub use session::{ApiSession, Attempt, SessionConfig};
pub use transport::{TlsMode, TransportConfig};

// Callers name HTTP methods without depending on reqwest directly.
pub use reqwest::Method;
