pub mod access_jwt;
pub mod authorizer;
pub mod claims;
pub mod error;
pub mod factory;

pub use access_jwt::TokenVerifier;
pub use authorizer::authorize;
pub use claims::{AuthClaims, Role};
pub use error::AuthError;
pub use factory::build_token_verifier;
