//! Daemon error type with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    #[error(transparent)]
    #[diagnostic(code(omada_dns::config), help("Check the config file and OMADA_* environment variables."))]
    Config(#[from] omada_config::ConfigError),

    #[error(transparent)]
    #[diagnostic(code(omada_dns::controller))]
    Core(#[from] omada_core::CoreError),

    #[error("IO error: {0}")]
    #[diagnostic(code(omada_dns::io))]
    Io(#[from] std::io::Error),

    #[error("DNS protocol error: {0}")]
    #[diagnostic(code(omada_dns::proto))]
    Proto(#[from] hickory_server::proto::error::ProtoError),
}
