use crate::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NearbyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("{0} session already active")]
    AlreadyActive(Role),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, NearbyError>;

/// Failure reported by the proximity transport when a start request is
/// rejected. Stop requests never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    /// System or API-level setup for the transport is missing
    #[error("Transport configuration error: {0}")]
    Configuration(String),

    /// Any other rejection of a start request
    #[error("Transport rejected the request: {0}")]
    Rejected(String),
}

impl TransportError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, TransportError::Configuration(_))
    }

    /// Actionable guidance for the caller
    pub fn guidance(&self) -> &'static str {
        match self {
            TransportError::Configuration(_) => {
                "Verify that the proximity transport is fully set up for this \
                 application, including any required API credentials."
            }
            TransportError::Rejected(_) => {
                "Check that proximity discovery is available on this device \
                 and try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_distinguished() {
        let config = TransportError::Configuration("no API key".to_string());
        let rejected = TransportError::Rejected("radio off".to_string());

        assert!(config.is_configuration());
        assert!(!rejected.is_configuration());
        assert_ne!(config.guidance(), rejected.guidance());
    }

    #[test]
    fn test_transport_error_converts_into_nearby_error() {
        let error: NearbyError = TransportError::Rejected("busy".to_string()).into();
        assert!(matches!(error, NearbyError::Transport(_)));
    }
}
