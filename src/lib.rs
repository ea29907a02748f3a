//! Hospital API gateway.
//!
//! Authenticates bearer tokens, authorizes by role, and forwards `/api/auth`,
//! `/api/paciente` and `/api/consulta` to their backend services.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
