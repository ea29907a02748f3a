use thiserror::Error;

/// Failures of the authentication / authorization gates.
///
/// Display text is the client-facing `message`; diagnostic detail is logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token not provided")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("token missing subject (sub)")]
    MissingSubject,
    #[error("user not authenticated")]
    Unauthenticated,
    #[error("access denied: insufficient permissions")]
    Forbidden,
}
