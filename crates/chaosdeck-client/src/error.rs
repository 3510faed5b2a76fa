//! Client error kinds.

use thiserror::Error;

/// Failure of one execution-service call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable response (connect/IO/decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx with a service-supplied detail message.
    #[error("{0}")]
    Service(String),

    /// Non-2xx without any detail to relay.
    #[error("request failed with status {0}")]
    Status(u16),
}
