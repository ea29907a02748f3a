use crate::services::auth::claims::{AuthClaims, Role};
use crate::services::auth::error::AuthError;

/// Role gate: the caller must be authenticated and hold one of `allowed`.
pub fn authorize(claims: Option<&AuthClaims>, allowed: &[Role]) -> Result<(), AuthError> {
    let claims = claims.ok_or(AuthError::Unauthenticated)?;

    if !claims.has_any_role(allowed) {
        tracing::warn!(
            subject = %claims.subject_id,
            role = ?claims.role,
            ?allowed,
            "access denied"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(())
}
