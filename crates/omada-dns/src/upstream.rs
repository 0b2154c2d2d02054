// Upstream forwarder backed by hickory-resolver.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveError;
use hickory_resolver::TokioAsyncResolver;
use hickory_server::proto::rr::{Record, RecordType};

use crate::resolver::Upstream;

/// Forwards questions to the single configured resolver over plain DNS.
pub struct ForwardingResolver {
    inner: TokioAsyncResolver,
}

impl ForwardingResolver {
    /// `timeout` bounds each upstream exchange so a dead resolver cannot
    /// hold query tasks indefinitely.
    pub fn new(upstream: IpAddr, timeout: Duration) -> Self {
        let config = ResolverConfig::from_parts(
            None,
            Vec::new(),
            NameServerConfigGroup::from_ips_clear(&[upstream], 53, true),
        );
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl Upstream for ForwardingResolver {
    async fn lookup(&self, name: &str, rtype: RecordType) -> Result<Vec<Record>, ResolveError> {
        let lookup = self.inner.lookup(name, rtype).await?;
        Ok(lookup.records().to_vec())
    }
}
