// Omada v2 API response types
//
// Every endpoint wraps its payload in the `{errorCode, msg, result}`
// envelope; paged reads nest a `{totalRows, data}` page inside `result`.
// Fields are modeled explicitly so a malformed response fails decoding
// instead of propagating missing-field accesses downstream.

use serde::Deserialize;
use serde_json::Value;

// ── Response envelope ────────────────────────────────────────────────

/// Standard Omada response envelope.
///
/// ```json
/// { "errorCode": 0, "msg": "Success.", "result": { ... } }
/// ```
///
/// `errorCode == 0` means success; anything else is a controller-reported
/// application error.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "errorCode")]
    pub error_code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
}

// ── Identity & login ─────────────────────────────────────────────────

/// Controller identity from `GET /api/info`, reachable without a session.
#[derive(Debug, Deserialize)]
pub struct ControllerInfo {
    #[serde(rename = "omadacId")]
    pub omadac_id: String,
}

/// Login response. The token doubles as the CSRF header value for every
/// subsequent call in the session.
#[derive(Debug, Deserialize)]
pub struct LoginResult {
    pub token: String,
}

/// Slice of `GET users/current` needed to resolve the site id.
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub privilege: Privilege,
}

#[derive(Debug, Deserialize)]
pub struct Privilege {
    #[serde(default)]
    pub sites: Vec<SitePrivilege>,
}

/// A site the authenticated user may operate on. `key` is the opaque site
/// id substituted into site-scoped paths.
#[derive(Debug, Deserialize)]
pub struct SitePrivilege {
    pub name: String,
    pub key: String,
}

// ── Paged reads ──────────────────────────────────────────────────────

/// One page of a paged read.
///
/// `totalRows` reports the full row count regardless of page size; callers
/// compare it against `data.len()` to detect a truncated single-page read.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct Paged<T> {
    #[serde(rename = "totalRows", default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub data: Vec<T>,
}

// ── Site settings ────────────────────────────────────────────────────

/// A controller-defined LAN network from `setting/lan/networks`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkInfo {
    pub id: String,
    pub name: String,
    /// DNS search domain of the network, appended to reservation names.
    pub domain: String,
}

/// A DHCP static-lease entry from `setting/service/dhcp`.
///
/// `description` is the only field the controller leaves blank in
/// practice; everything else is required.
#[derive(Debug, Clone, Deserialize)]
pub struct Reservation {
    #[serde(default)]
    pub description: String,
    pub mac: String,
    #[serde(rename = "clientName")]
    pub client_name: String,
    pub ip: String,
    #[serde(rename = "netId")]
    pub net_id: String,
}
