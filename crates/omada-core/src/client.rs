// Domain reads against the controller.
//
// Thin translation layer: site-scoped endpoint paths, paged-envelope
// unwrapping, and override-table assembly on top of `ApiSession`.

use omada_api::models::{NetworkInfo, Paged, Reservation};
use omada_api::{ApiSession, Method, SessionConfig, TransportConfig};
use tracing::debug;

use crate::error::CoreError;
use crate::table::OverrideTable;

// Both reads take the first page with a size far above any realistic row
// count. Multi-page aggregation is deliberately not implemented;
// `require_single_page` fails loudly if the controller reports more.
const NETWORKS_PATH: &str =
    "sites/{SITEID}/setting/lan/networks?currentPage=1&currentPageSize=999";
const DHCP_PATH: &str =
    "sites/{SITEID}/setting/service/dhcp?currentPage=1&currentPageSize=999";

/// Read side of the controller API, scoped to one site.
pub struct ControllerClient {
    session: ApiSession,
}

impl ControllerClient {
    pub fn new(config: SessionConfig, transport: &TransportConfig) -> Result<Self, CoreError> {
        Ok(Self {
            session: ApiSession::new(config, transport)?,
        })
    }

    /// List the site's LAN networks.
    pub async fn networks(&self) -> Result<Vec<NetworkInfo>, CoreError> {
        debug!("listing lan networks");
        let page: Paged<NetworkInfo> = self.session.request(Method::GET, NETWORKS_PATH, None).await?;
        require_single_page(page, "lan networks")
    }

    /// List the site's DHCP static-lease reservations.
    pub async fn dhcp_reservations(&self) -> Result<Vec<Reservation>, CoreError> {
        debug!("listing dhcp reservations");
        let page: Paged<Reservation> = self.session.request(Method::GET, DHCP_PATH, None).await?;
        require_single_page(page, "dhcp reservations")
    }

    /// Fetch networks and reservations and assemble a fresh override
    /// table. Any inconsistency fails the whole build; see
    /// [`OverrideTable::build`].
    pub async fn build_override_table(&self) -> Result<OverrideTable, CoreError> {
        let networks = self.networks().await?;
        let reservations = self.dhcp_reservations().await?;
        OverrideTable::build(&networks, &reservations)
    }
}

fn require_single_page<T>(page: Paged<T>, what: &'static str) -> Result<Vec<T>, CoreError> {
    if let Some(total) = page.total_rows {
        let fetched = page.data.len() as u64;
        if total > fetched {
            return Err(CoreError::PageOverflow {
                what,
                total,
                fetched,
            });
        }
    }
    Ok(page.data)
}
