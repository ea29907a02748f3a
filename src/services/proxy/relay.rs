//! Relay an upstream response back to the caller.
//!
//! - status < 400: status + end-to-end headers, body streamed through untouched
//! - status >= 400: body buffered and re-emitted byte for byte; JSON bodies are labelled
//!   `application/json`, anything else keeps the upstream content headers

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use serde::de::IgnoredAny;

use crate::services::proxy::error::UpstreamError;
use crate::services::proxy::headers::relayed_response_headers;

pub async fn relay(
    service: &'static str,
    upstream: reqwest::Response,
) -> Result<Response, UpstreamError> {
    let status = upstream.status();

    if status.as_u16() >= 400 {
        let headers = upstream.headers().clone();
        let body = upstream
            .bytes()
            .await
            .map_err(|e| {
                let err = UpstreamError::new(service, e);
                tracing::error!(service, error = %err.detail(), "failed to read upstream error body");
                err
            })?;
        tracing::debug!(service, %status, bytes = body.len(), "relaying upstream error");
        return Ok(relay_error(status, &headers, body));
    }

    let headers = relayed_response_headers(upstream.headers());
    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

pub fn relay_error(status: StatusCode, upstream_headers: &HeaderMap, body: Bytes) -> Response {
    let mut headers = relayed_response_headers(upstream_headers);
    headers.remove(header::CONTENT_LENGTH);

    // Validated only; the bytes go out as received so key order and number text survive.
    if serde_json::from_slice::<IgnoredAny>(&body).is_ok() {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    } else if !headers.contains_key(header::CONTENT_TYPE)
        && !body.is_empty()
        && std::str::from_utf8(&body).is_ok()
    {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    fn upstream_headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (name, value) in pairs {
            h.insert(*name, HeaderValue::from_static(value));
        }
        h
    }

    #[tokio::test]
    async fn json_error_keeps_status_and_payload() {
        let response = relay_error(
            StatusCode::NOT_FOUND,
            &HeaderMap::new(),
            Bytes::from_static(br#"{"error":"not found"}"#),
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_of(response).await, br#"{"error":"not found"}"#);
    }

    #[tokio::test]
    async fn json_error_keeps_key_order_and_number_text() {
        let raw = br#"{"status":400,"error":"Bad Request","message":"cpf invalido","id":123456789012345678901234567890}"#;
        let response = relay_error(
            StatusCode::BAD_REQUEST,
            &upstream_headers(&[("content-type", "application/problem+json")]),
            Bytes::from_static(raw),
        );

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_of(response).await, raw);
    }

    #[tokio::test]
    async fn non_json_error_is_raw_text() {
        let response = relay_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &HeaderMap::new(),
            Bytes::from_static(b"internal failure"),
        );

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_of(response).await, b"internal failure");
    }

    #[tokio::test]
    async fn binary_error_body_is_not_altered() {
        let raw: &[u8] = &[0x1f, 0x8b, 0x08, 0x00, 0xff, 0xfe];
        let response = relay_error(
            StatusCode::SERVICE_UNAVAILABLE,
            &upstream_headers(&[
                ("content-type", "text/html"),
                ("content-encoding", "gzip"),
                ("content-length", "6"),
                ("connection", "close"),
            ]),
            Bytes::copy_from_slice(raw),
        );

        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/html");
        assert_eq!(headers.get(header::CONTENT_ENCODING).unwrap(), "gzip");
        assert!(headers.get(header::CONNECTION).is_none());
        assert_eq!(body_of(response).await, raw);
    }

    #[tokio::test]
    async fn empty_error_body_stays_empty() {
        let response = relay_error(StatusCode::UNAUTHORIZED, &HeaderMap::new(), Bytes::new());

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert!(body_of(response).await.is_empty());
    }
}
