use caminos::CaminoError;
use thiserror::Error;

use crate::rpc::common::ErrorResponse;

/// Errors thrown by providers
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Serde issue
    #[error(transparent)]
    SerdeJSONError(#[from] serde_json::Error),

    /// The HTTP request failed
    #[error(transparent)]
    FetchError(#[from] reqwest::Error),

    /// Bubbled up from the encoders
    #[error(transparent)]
    EncoderError(#[from] camino_core::enc::EncodingError),

    /// Bubbled up from the wire codec
    #[error(transparent)]
    CoreSerError(#[from] camino_core::ser::SerError),

    /// Bubbled up from caminos
    #[error(transparent)]
    CaminoError(#[from] CaminoError),

    /// The node answered with a JSON-RPC error
    #[error("RPC Error Response: {0}")]
    RPCErrorResponse(ErrorResponse),

    /// The node answered with something that does not parse as the expected type
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Returns true if the request failed due to a local parsing error, rather than the
    /// transport or the node.
    pub fn from_parsing(&self) -> bool {
        matches!(
            self,
            ProviderError::SerdeJSONError(_)
                | ProviderError::EncoderError(_)
                | ProviderError::CoreSerError(_)
                | ProviderError::Unexpected(_)
        )
    }
}

impl From<ProviderError> for CaminoError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::CaminoError(e) => e,
            e => CaminoError::Rpc(e.to_string()),
        }
    }
}

/// Type alias for results with a `ProviderError`
pub type ProviderResult<T> = Result<T, ProviderError>;
