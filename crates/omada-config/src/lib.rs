//! Runtime configuration for the omada-dns daemon.
//!
//! Layered loading: serde defaults ← optional TOML file ← `OMADA_*`
//! environment variables. Field names double as environment names
//! (`OMADA_HOST`, `OMADA_INTERVAL`, `OMADA_DNS_RESOLVE`, ...), so the
//! daemon runs from the environment alone.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use omada_api::{SessionConfig, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Daemon settings: controller connection, refresh cadence, and the DNS
/// listen/forward surface.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Controller hostname or address.
    pub host: String,

    /// Controller HTTPS port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Site name as shown in the controller UI.
    pub site: String,

    pub username: String,

    pub password: SecretString,

    /// Override-table refresh period in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Per-request controller timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept the controller's self-signed certificate (the Omada
    /// factory default). Set to `false` to require the system trust
    /// store.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// DNS listen address.
    #[serde(default = "default_dns_address")]
    pub dns_address: IpAddr,

    /// DNS listen port (UDP and TCP).
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Upstream resolver consulted for names without a local override.
    #[serde(default = "default_dns_resolve")]
    pub dns_resolve: IpAddr,
}

fn default_port() -> u16 {
    443
}
fn default_interval() -> u64 {
    10
}
fn default_timeout() -> u64 {
    30
}
fn default_insecure() -> bool {
    true
}
fn default_dns_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
fn default_dns_port() -> u16 {
    53
}
fn default_dns_resolve() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))
}

impl Settings {
    /// Load settings from an optional TOML file with environment
    /// overrides.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        Self::from_figment(figment.merge(Env::prefixed("OMADA_")))
    }

    /// Extract and validate settings from an assembled figment. Split out
    /// so tests can feed providers directly.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("host", &self.host),
            ("site", &self.site),
            ("username", &self.username),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must not be empty".into(),
                });
            }
        }
        if self.interval == 0 {
            return Err(ConfigError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Ok(())
    }

    /// Connection parameters for the controller session.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let base_url = Url::parse(&format!("https://{}:{}/", self.host, self.port)).map_err(
            |e| ConfigError::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
        )?;
        Ok(SessionConfig {
            base_url,
            site: self.site.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    /// HTTP transport settings for the controller session.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            tls: if self.insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            timeout: Duration::from_secs(self.timeout),
        }
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.dns_address, self.dns_port)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_figment(Figment::new().merge(Toml::string(toml)))
    }

    const MINIMAL: &str = r#"
        host = "192.168.0.2"
        site = "home"
        username = "admin"
        password = "hunter2"
    "#;

    #[test]
    fn minimal_config_applies_defaults() {
        let settings = from_toml(MINIMAL).unwrap();

        assert_eq!(settings.port, 443);
        assert_eq!(settings.interval, 10);
        assert_eq!(settings.timeout, 30);
        assert!(settings.insecure);
        assert_eq!(settings.listen_addr(), "0.0.0.0:53".parse().unwrap());
        assert_eq!(settings.dns_resolve, "8.8.8.8".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            host = "omada.example"
            port = 8043
            site = "home"
            username = "admin"
            password = "hunter2"
            interval = 60
            dns_port = 5353
            dns_resolve = "1.1.1.1"
            insecure = false
        "#,
        )
        .unwrap();

        assert_eq!(settings.port, 8043);
        assert_eq!(settings.interval, 60);
        assert_eq!(settings.dns_port, 5353);
        assert!(!settings.insecure);
        assert!(matches!(
            settings.transport_config().tls,
            TlsMode::System
        ));
    }

    #[test]
    fn session_config_folds_host_and_port_into_the_url() {
        let settings = from_toml(MINIMAL).unwrap();
        let config = settings.session_config().unwrap();

        assert_eq!(config.base_url.as_str(), "https://192.168.0.2/");
        assert_eq!(config.site, "home");
    }

    #[test]
    fn empty_site_is_rejected() {
        let result = from_toml(
            r#"
            host = "192.168.0.2"
            site = ""
            username = "admin"
            password = "hunter2"
        "#,
        );

        assert!(
            matches!(result, Err(ConfigError::Validation { ref field, .. }) if field == "site"),
            "expected validation error, got: {result:?}"
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = from_toml(
            r#"
            host = "192.168.0.2"
            site = "home"
            username = "admin"
            password = "hunter2"
            interval = 0
        "#,
        );

        assert!(
            matches!(result, Err(ConfigError::Validation { ref field, .. }) if field == "interval"),
            "expected validation error, got: {result:?}"
        );
    }

    #[test]
    fn missing_required_field_is_a_figment_error() {
        let result = from_toml(r#"host = "192.168.0.2""#);
        assert!(matches!(result, Err(ConfigError::Figment(_))));
    }
}
