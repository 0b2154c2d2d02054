// Query resolution: override table first, upstream for everything else.
//
// Local answers are IPv4-only, so only A/IN questions consult the table;
// any other type or class is forwarded unconditionally, even when the
// name has an override.

use async_trait::async_trait;
use hickory_resolver::error::ResolveError;
use hickory_server::proto::rr::{DNSClass, Record, RecordType};

use omada_core::{OverrideAnswer, OverrideStore};

/// Upstream resolver consulted for every question the override table
/// does not answer.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn lookup(&self, name: &str, rtype: RecordType) -> Result<Vec<Record>, ResolveError>;
}

/// How one question was answered.
#[derive(Debug)]
pub enum Resolution {
    /// Answered from the override table.
    Local(OverrideAnswer),
    /// Delegated upstream; records are passed through verbatim.
    Forwarded(Vec<Record>),
}

/// Stateless per-question resolver over the shared override snapshot.
pub struct QueryResolver<U> {
    overrides: OverrideStore,
    upstream: U,
}

impl<U: Upstream> QueryResolver<U> {
    pub fn new(overrides: OverrideStore, upstream: U) -> Self {
        Self {
            overrides,
            upstream,
        }
    }

    /// Resolve one question against the current override snapshot (one
    /// atomic load, never blocked by a concurrent refresh), falling
    /// through to the upstream on a miss. Upstream failures propagate to
    /// the caller.
    pub async fn resolve(
        &self,
        name: &str,
        rtype: RecordType,
        class: DNSClass,
    ) -> Result<Resolution, ResolveError> {
        if rtype == RecordType::A && class == DNSClass::IN {
            if let Some(answer) = self.overrides.load().lookup(name) {
                return Ok(Resolution::Local(answer.clone()));
            }
        }

        let records = self.upstream.lookup(name, rtype).await?;
        Ok(Resolution::Forwarded(records))
    }
}
