//! Header rewriting between the caller and an upstream.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

use crate::services::auth::AuthClaims;
use crate::services::proxy::upstream::{AuthorizationHeader, IdentityHeaders};

pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
pub const X_USER_CPF: HeaderName = HeaderName::from_static("x-user-cpf");
pub const X_USER_EMAIL: HeaderName = HeaderName::from_static("x-user-email");
pub const X_USER_TYPE: HeaderName = HeaderName::from_static("x-user-type");

const IDENTITY_HEADERS: [HeaderName; 4] = [X_USER_ID, X_USER_CPF, X_USER_EMAIL, X_USER_TYPE];

// Connection-scoped; never forwarded by a proxy (RFC 9110 §7.6.1).
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in `Connection` are hop-by-hop too.
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Build the header map sent upstream from the caller's headers.
///
/// - Host / Content-Length are recomputed by the HTTP client.
/// - Caller-supplied identity headers are always dropped; only verified claims produce them.
/// - `Authorization` is either removed or forwarded verbatim from the inbound request.
pub fn outbound_request_headers(
    inbound: &HeaderMap,
    authorization: AuthorizationHeader,
    identity: IdentityHeaders,
    claims: Option<&AuthClaims>,
) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    for name in &IDENTITY_HEADERS {
        headers.remove(name);
    }

    if authorization == AuthorizationHeader::Strip {
        headers.remove(header::AUTHORIZATION);
    }

    if let Some(claims) = claims {
        inject_identity(&mut headers, identity, claims);
    }

    headers
}

fn inject_identity(headers: &mut HeaderMap, identity: IdentityHeaders, claims: &AuthClaims) {
    let mut values = match identity {
        IdentityHeaders::None => return,
        IdentityHeaders::Basic | IdentityHeaders::Full => vec![
            (X_USER_ID, Some(claims.subject_id.as_str())),
            (X_USER_CPF, claims.cpf.as_deref()),
            (X_USER_EMAIL, claims.email.as_deref()),
        ],
    };
    if identity == IdentityHeaders::Full {
        values.push((X_USER_TYPE, claims.role.map(|r| r.as_str())));
    }

    for (name, value) in values {
        let Some(value) = value else { continue };
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(_) => tracing::warn!(header = %name, "claim is not a valid header value; omitted"),
        }
    }
}

/// Upstream response headers relayed to the caller with a streamed (unmodified) body.
pub fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    strip_hop_by_hop(&mut headers);
    headers
}
