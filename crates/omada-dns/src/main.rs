mod cli;
mod error;
mod resolver;
mod server;
mod upstream;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use omada_core::{refresh_task, ControllerClient, OverrideStore};

use crate::cli::Cli;
use crate::error::ServerError;
use crate::resolver::QueryResolver;
use crate::server::DnsHandler;
use crate::upstream::ForwardingResolver;

/// Timeout for one upstream DNS exchange.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let settings = omada_config::Settings::load(cli.config.as_deref())?;
    if settings.insecure {
        warn!("TLS certificate validation is disabled (self-signed controller certs)");
    }

    let client = Arc::new(ControllerClient::new(
        settings.session_config()?,
        &settings.transport_config(),
    )?);
    let store = OverrideStore::new();
    let cancel = CancellationToken::new();

    // Refresh and query handling share nothing but the snapshot store;
    // a slow controller never blocks query tasks.
    let refresh = tokio::spawn(refresh_task(
        client,
        store.clone(),
        settings.refresh_period(),
        cancel.clone(),
    ));

    let upstream = ForwardingResolver::new(settings.dns_resolve, UPSTREAM_TIMEOUT);
    let handler = DnsHandler::new(QueryResolver::new(store, upstream));

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received ctrl-c, shutting down");
            }
            cancel.cancel();
        }
    });

    let result = server::serve(handler, settings.listen_addr(), cancel.clone()).await;

    cancel.cancel();
    let _ = refresh.await;
    result
}
