//! Construction-time error taxonomy

use thiserror::Error;

/// Fatal failures while building a context.
///
/// Anything that goes wrong during construction unwinds the whole context;
/// nothing half-built stays live. Steady-state failures (queue full, connect
/// refused) have their own local types and never interrupt audio.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CvError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("allocation failed: {0}")]
    Allocation(String),
    #[error("endpoint registration failed: {0}")]
    EndpointRegistration(String),
    #[error("host activation failed: {0}")]
    Activation(String),
}
