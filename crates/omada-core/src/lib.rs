// omada-core: Override-table domain layer between omada-api and the DNS
// server -- controller reads, table construction, the shared snapshot
// store, and the periodic refresh task.

pub mod client;
pub mod error;
pub mod refresh;
pub mod store;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::ControllerClient;
pub use error::CoreError;
pub use refresh::{refresh_once, refresh_task};
pub use store::OverrideStore;
pub use table::{OverrideAnswer, OverrideTable, DEFAULT_TTL};
