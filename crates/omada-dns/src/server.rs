//! DNS server setup and lifecycle.
//!
//! Bridges hickory's request handling onto the query resolver and runs
//! the UDP/TCP server until shutdown. Every request gets a response: a
//! local answer, the upstream's records verbatim, or an error code.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::error::ResolveErrorKind;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::proto::op::{Header, ResponseCode};
use hickory_server::proto::rr::rdata::A;
use hickory_server::proto::rr::{RData, Record};
use hickory_server::server::{
    Request, RequestHandler, ResponseHandler, ResponseInfo, ServerFuture,
};
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ServerError;
use crate::resolver::{QueryResolver, Resolution, Upstream};

/// Timeout for idle TCP connections.
const TCP_TIMEOUT: Duration = Duration::from_secs(30);

/// hickory `RequestHandler` answering from the query resolver.
pub struct DnsHandler<U> {
    resolver: QueryResolver<U>,
}

impl<U: Upstream> DnsHandler<U> {
    pub fn new(resolver: QueryResolver<U>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<U: Upstream + Unpin + 'static> RequestHandler for DnsHandler<U> {
    async fn handle_request<R>(&self, request: &Request, mut response_handle: R) -> ResponseInfo
    where
        R: ResponseHandler,
    {
        let query = request.query();
        let qname = query.name().to_string();
        let qname = qname.trim_end_matches('.');

        let mut header = Header::response_from_request(request.header());
        header.set_recursion_available(true);
        let builder = MessageResponseBuilder::from_message_request(request);

        match self
            .resolver
            .resolve(qname, query.query_type(), query.query_class())
            .await
        {
            Ok(Resolution::Local(answer)) => {
                debug!(name = qname, address = %answer.address, "answered from override table");
                let records = [Record::from_rdata(
                    query.name().clone().into(),
                    answer.ttl,
                    RData::A(A(answer.address)),
                )];
                let response = builder.build(
                    header,
                    records.iter(),
                    std::iter::empty(),
                    std::iter::empty(),
                    std::iter::empty(),
                );
                match response_handle.send_response(response).await {
                    Ok(info) => info,
                    Err(e) => {
                        error!(error = %e, "failed to send DNS response");
                        ResponseInfo::from(Header::response_from_request(request.header()))
                    }
                }
            }

            Ok(Resolution::Forwarded(records)) => {
                debug!(name = qname, answers = records.len(), "forwarded upstream");
                let response = builder.build(
                    header,
                    records.iter(),
                    std::iter::empty(),
                    std::iter::empty(),
                    std::iter::empty(),
                );
                match response_handle.send_response(response).await {
                    Ok(info) => info,
                    Err(e) => {
                        error!(error = %e, "failed to send DNS response");
                        ResponseInfo::from(Header::response_from_request(request.header()))
                    }
                }
            }

            Err(e) => {
                let code = match e.kind() {
                    // Negative upstream answers keep their response code.
                    ResolveErrorKind::NoRecordsFound { response_code, .. } => *response_code,
                    _ => {
                        warn!(name = qname, error = %e, "upstream resolution failed");
                        ResponseCode::ServFail
                    }
                };
                header.set_response_code(code);
                let response = builder.build_no_records(header);
                match response_handle.send_response(response).await {
                    Ok(info) => info,
                    Err(e) => {
                        error!(error = %e, "failed to send DNS response");
                        ResponseInfo::from(Header::response_from_request(request.header()))
                    }
                }
            }
        }
    }
}

/// Run the DNS server on UDP and TCP until `cancel` fires.
pub async fn serve<U>(
    handler: DnsHandler<U>,
    listen: SocketAddr,
    cancel: CancellationToken,
) -> Result<(), ServerError>
where
    U: Upstream + Unpin + 'static,
{
    let mut server = ServerFuture::new(handler);

    let udp = UdpSocket::bind(listen).await?;
    info!(addr = %listen, "DNS UDP listening");
    server.register_socket(udp);

    let tcp = TcpListener::bind(listen).await?;
    info!(addr = %listen, "DNS TCP listening");
    server.register_listener(tcp, TCP_TIMEOUT);

    tokio::select! {
        _ = cancel.cancelled() => {
            info!("DNS server shutdown requested");
            server.shutdown_gracefully().await?;
        }
        result = server.block_until_done() => result?,
    }

    Ok(())
}
