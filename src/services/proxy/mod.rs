pub mod error;
pub mod forwarder;
pub mod headers;
pub mod relay;
pub mod upstream;

pub use error::UpstreamError;
pub use forwarder::Forwarder;
pub use upstream::{Service, UpstreamTarget, Upstreams};
