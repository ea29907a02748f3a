use std::time::Duration;

use axum::{body::Bytes, http::request::Parts, response::Response};

use crate::services::auth::AuthClaims;
use crate::services::proxy::error::UpstreamError;
use crate::services::proxy::headers::outbound_request_headers;
use crate::services::proxy::relay::relay;
use crate::services::proxy::upstream::{RouteRule, UpstreamTarget};

/// Outbound HTTP client shared by all upstreams.
///
/// - One attempt per inbound request, bounded by `timeout`.
/// - Redirects are relayed to the caller, not followed.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    /// Send the caller's request to `target` and relay the answer.
    ///
    /// If the caller goes away, this future is dropped together with the in-flight request.
    pub async fn forward(
        &self,
        target: &UpstreamTarget,
        rule: &RouteRule,
        claims: Option<&AuthClaims>,
        parts: &Parts,
        suffix: &str,
        body: Bytes,
    ) -> Result<Response, UpstreamError> {
        let url = target.url_for(suffix, parts.uri.query());
        let headers =
            outbound_request_headers(&parts.headers, target.authorization, rule.identity, claims);

        tracing::debug!(
            service = target.service,
            method = %parts.method,
            %url,
            "forwarding request"
        );

        let mut request = self
            .client
            .request(parts.method.clone(), url)
            .headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let upstream = request.send().await.map_err(|e| {
            let err = UpstreamError::new(target.service, e);
            tracing::error!(
                service = target.service,
                timeout = err.is_timeout(),
                error = %err.detail(),
                "upstream request failed"
            );
            err
        })?;

        relay(target.service, upstream).await
    }
}
