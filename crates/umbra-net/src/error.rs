//! Error types

use umbra_core::ProviderError;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON-RPC error object returned by the node or wallet
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for ProviderError {
    fn from(e: Error) -> Self {
        match e {
            Error::Rpc { code, message } => ProviderError::from_rpc(code, message),
            other => ProviderError::Transport(other.to_string()),
        }
    }
}

impl From<Error> for umbra_core::Error {
    fn from(e: Error) -> Self {
        umbra_core::Error::Provider(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_errors_keep_their_meaning() {
        let rejected: ProviderError = Error::Rpc {
            code: 4001,
            message: "User denied message signature".to_string(),
        }
        .into();
        assert_eq!(rejected, ProviderError::Rejected);

        let reverted: ProviderError = Error::Rpc {
            code: -32000,
            message: "execution reverted".to_string(),
        }
        .into();
        assert!(matches!(reverted, ProviderError::Reverted(_)));
    }

    #[test]
    fn test_transport_failures() {
        let err: umbra_core::Error = Error::Http("connection refused".to_string()).into();
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            umbra_core::Error::Provider(ProviderError::Transport(_))
        ));
    }
}
