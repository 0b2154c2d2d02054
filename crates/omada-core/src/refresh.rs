// ── Periodic override-table refresh ──
//
// One cycle at a time: the next tick is waited on only after the current
// refresh completes, so cycles never overlap. Failures leave the previous
// snapshot active -- queries degrade to stale-but-available data.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ControllerClient;
use crate::store::OverrideStore;

/// Periodically rebuild the override table and publish it to `store`.
///
/// The first cycle runs immediately; subsequent cycles run every
/// `period` until `cancel` fires.
pub async fn refresh_task(
    client: Arc<ControllerClient>,
    store: OverrideStore,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => refresh_once(&client, &store).await,
        }
    }

    debug!("refresh task stopped");
}

/// Run one refresh cycle against the controller.
///
/// Errors are terminal for the cycle only: they are logged and the store
/// keeps its previous snapshot.
pub async fn refresh_once(client: &ControllerClient, store: &OverrideStore) {
    match client.build_override_table().await {
        Ok(table) => {
            debug!(entries = table.len(), "override table refreshed");
            store.publish(table);
        }
        Err(e) => warn!(error = %e, "refresh failed; keeping previous override table"),
    }
}
