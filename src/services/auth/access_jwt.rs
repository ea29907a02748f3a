use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashSet;

use crate::services::auth::claims::{AuthClaims, Role};
use crate::services::auth::error::AuthError;

/// Raw access token payload as issued by the auth service.
///
/// Everything except the signature-bound envelope is optional here; the presence of `sub`
/// is checked after decoding so a missing subject can be reported separately.
#[derive(Debug, Clone, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    cpf: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "type")]
    user_type: Option<String>,
}

/// HS256 bearer-token verifier.
///
/// - Key material is intentionally not printable via Debug.
/// - Without a secret every token is rejected as invalid.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("configured", &self.decoding_key.is_some())
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: Option<&str>, leeway_seconds: u64) -> Self {
        let decoding_key = secret.map(|s| DecodingKey::from_secret(s.as_bytes()));

        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` / `nbf` are checked when present but not required.
        validation.required_spec_claims = HashSet::new();
        validation.validate_nbf = true;
        // The auth service issues tokens without `aud`/`iss`.
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify the raw `Authorization` header value and extract the caller's claims.
    pub fn verify(&self, header_value: Option<&str>) -> Result<AuthClaims, AuthError> {
        let token = bearer_token(header_value).ok_or_else(|| {
            tracing::warn!("bearer token missing from Authorization header");
            AuthError::MissingToken
        })?;

        let Some(key) = self.decoding_key.as_ref() else {
            tracing::warn!("token verification failed: JWT_SECRET is not configured");
            return Err(AuthError::InvalidToken);
        };

        let claims = match jsonwebtoken::decode::<AccessTokenClaims>(token, key, &self.validation)
        {
            Ok(data) => data.claims,
            Err(err) => {
                tracing::warn!(error = %err, "token verification failed");
                return Err(AuthError::InvalidToken);
            }
        };

        let subject_id = match claims.sub {
            Some(sub) if !sub.trim().is_empty() => sub,
            _ => {
                tracing::warn!("token missing 'sub' claim");
                return Err(AuthError::MissingSubject);
            }
        };

        let role = claims.user_type.as_deref().and_then(|t| match t.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::debug!(error = %err, "token carries an unrecognized role");
                None
            }
        });

        Ok(AuthClaims {
            subject_id,
            cpf: claims.cpf,
            email: claims.email,
            role,
        })
    }
}

// `Bearer <token>` → `<token>`; anything else (absent header, other scheme, empty token) is None.
fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    let token = header_value?.trim().strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
