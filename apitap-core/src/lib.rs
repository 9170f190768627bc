pub mod config;
pub mod entry;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod sanitize;

pub use config::{CaptureConfig, ScopeId};
pub use entry::LogEntry;
pub use error::ApitapError;
pub use matcher::EndpointMatcher;
