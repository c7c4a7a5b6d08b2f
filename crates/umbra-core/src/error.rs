//! Error types for the wallet session
//!
//! Every failure the session can observe maps onto one of these variants.
//! None of them is fatal to the process; callers degrade to a narrower
//! snapshot instead.

use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Wallet session errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// No provider connected
    #[error("Wallet not connected")]
    NotConnected,

    /// No signer bound to the session
    #[error("No signer connected")]
    NoSigner,

    /// Active network has no protocol instance
    #[error("No Umbra instance available. Please make sure you are on a supported network")]
    NoProtocolInstance,

    /// Chain outside the allow-list
    #[error("Unsupported network: chain id {0}")]
    UnsupportedNetwork(u64),

    /// Name is not registered in its naming system
    #[error("Domain {0} is not registered")]
    NameNotRegistered(String),

    /// Name is registered but carries no protocol keys
    #[error("Public keys not found for {0}. User must setup their Umbra account")]
    KeysNotSet(String),

    /// Name does not belong to a recognized naming system
    #[error("Unsupported name: {0}")]
    UnsupportedName(String),

    /// User declined a signature prompt
    #[error("Request denied")]
    Denied,

    /// Multicall round trip failed
    #[error("Balance aggregation failed: {0}")]
    AggregationFailure(String),

    /// Provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// ABI encoding or decoding error
    #[error("ABI error: {0}")]
    Abi(String),

    /// Invalid public or private key material
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Anything else
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

/// Failures reported by the wallet provider boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// User rejected the request (EIP-1193 code 4001)
    #[error("User rejected the request")]
    Rejected,

    /// Contract call reverted
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// JSON-RPC error response
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider is disconnected from the chain
    #[error("Provider disconnected")]
    Disconnected,
}

impl ProviderError {
    /// EIP-1193 code for user rejection
    pub const USER_REJECTED_CODE: i64 = 4001;

    /// EIP-1193 code for a provider with no authorized accounts
    pub const UNAUTHORIZED_CODE: i64 = 4100;

    /// Build from a JSON-RPC error object
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == Self::USER_REJECTED_CODE {
            ProviderError::Rejected
        } else if code == 3 || message.contains("revert") {
            ProviderError::Reverted(message)
        } else {
            ProviderError::Rpc { code, message }
        }
    }
}

impl Error {
    /// True for naming lookups that simply found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NameNotRegistered(_) | Error::KeysNotSet(_))
    }

    /// True when the wallet exposes no account, e.g. while locked
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::Provider(ProviderError::Rpc { code, .. })
                if *code == ProviderError::UNAUTHORIZED_CODE
        )
    }

    /// True for a declined prompt, whether reported directly or by the provider
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            Error::Denied | Error::Provider(ProviderError::Rejected)
        )
    }

    /// Check if retrying the same operation later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Denied
                | Error::AggregationFailure(_)
                | Error::Provider(ProviderError::Rejected)
                | Error::Provider(ProviderError::Transport(_))
                | Error::Provider(ProviderError::Disconnected)
        )
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::NotConnected | Error::NoSigner => {
                "Please connect your wallet to continue.".to_string()
            }
            Error::UnsupportedNetwork(_) | Error::NoProtocolInstance => {
                "This network is not supported. Please switch to a supported network.".to_string()
            }
            Error::KeysNotSet(name) => {
                format!("{} has not been set up to receive Umbra payments yet.", name)
            }
            Error::Denied => {
                "The signature request was declined. You can try again at any time.".to_string()
            }
            Error::AggregationFailure(_) => {
                "Unable to load balances right now. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotConnected | Error::NoSigner => ErrorCategory::Connection,
            Error::UnsupportedNetwork(_) | Error::NoProtocolInstance => ErrorCategory::Network,
            Error::NameNotRegistered(_) | Error::KeysNotSet(_) | Error::UnsupportedName(_) => {
                ErrorCategory::Naming
            }
            Error::Denied | Error::InvalidKey(_) => ErrorCategory::Keys,
            Error::AggregationFailure(_) => ErrorCategory::Balances,
            Error::Provider(_) => ErrorCategory::Provider,
            Error::Abi(_) | Error::Unexpected(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Provider or signer missing
    Connection,
    /// Network support
    Network,
    /// Naming-system lookups
    Naming,
    /// Protocol keys
    Keys,
    /// Balance aggregation
    Balances,
    /// Provider transport
    Provider,
    /// Internal/system errors
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Connection => write!(f, "Connection"),
            ErrorCategory::Network => write!(f, "Network"),
            ErrorCategory::Naming => write!(f, "Naming"),
            ErrorCategory::Keys => write!(f, "Keys"),
            ErrorCategory::Balances => write!(f, "Balances"),
            ErrorCategory::Provider => write!(f, "Provider"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}
