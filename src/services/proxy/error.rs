use std::error::Error as StdError;

use thiserror::Error;

/// Transport-level failure talking to an upstream (refused, timed out, DNS, broken body).
#[derive(Debug, Error)]
#[error("error communicating with {service} service")]
pub struct UpstreamError {
    pub service: &'static str,
    #[source]
    source: reqwest::Error,
}

impl UpstreamError {
    pub fn new(service: &'static str, source: reqwest::Error) -> Self {
        Self { service, source }
    }

    pub fn is_timeout(&self) -> bool {
        self.source.is_timeout()
    }

    /// Transport error text including its source chain, e.g.
    /// `error sending request for url (...): client error (Connect): tcp connect error: ...`.
    pub fn detail(&self) -> String {
        let mut detail = self.source.to_string();
        let mut next = self.source.source();
        while let Some(err) = next {
            let text = err.to_string();
            if !detail.ends_with(&text) {
                detail.push_str(": ");
                detail.push_str(&text);
            }
            next = err.source();
        }
        detail
    }
}
