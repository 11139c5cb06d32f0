//! Error taxonomy for the map renderer.
//!
//! ERROR HANDLING
//! ==============
//! Every variant is handled at the component boundary that produced it (floor
//! loader, route model, API client) and surfaced to the user as a non-blocking
//! status message with an empty render state. None are fatal to the host.
//! Stale asynchronous results are not errors and never reach this type.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Stable, machine-readable classification of an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced by the map renderer and its collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    /// The floor-plan resource was unreachable or answered with a non-success status.
    #[error("could not load floor plan {uri}: {reason}")]
    Load { uri: String, reason: String },

    /// The resource was retrieved but is not a valid vector document.
    #[error("floor plan is not a valid vector document: {0}")]
    Parse(String),

    /// The route payload was malformed or unusable.
    #[error("{0}")]
    InvalidPath(String),

    /// No coordinate space could be derived for a floor.
    #[error("floor plan has no usable coordinate space: {0}")]
    Dimension(String),

    /// A request to the route or room service failed.
    #[error("{0}")]
    Http(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl ErrorCode for MapError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Load { .. } => "E_LOAD",
            Self::Parse(_) => "E_PARSE",
            Self::InvalidPath(_) => "E_INVALID_PATH",
            Self::Dimension(_) => "E_DIMENSION",
            Self::Http(_) => "E_HTTP",
            Self::Config(_) => "E_CONFIG",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Http(_))
    }
}
