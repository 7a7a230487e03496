// Discovery strategy - immutable configuration shared by both session roles

use crate::{NearbyError, Result};
use serde::{Deserialize, Serialize};

/// TTL applied when no explicit value is configured
pub const DEFAULT_TTL_SECONDS: u32 = 20;

/// Discovery parameters for publish and subscribe sessions. Never mutated
/// after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    ttl_seconds: u32,
}

impl Strategy {
    /// Create a strategy with the given TTL in whole seconds (minimum 1)
    pub fn with_ttl(ttl_seconds: u32) -> Result<Self> {
        if ttl_seconds == 0 {
            return Err(NearbyError::InvalidConfig(
                "ttl_seconds must be at least 1".to_string(),
            ));
        }
        Ok(Self { ttl_seconds })
    }

    /// Duration after which an active session auto-expires
    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ttl_accepted() {
        for ttl in [1, 20, 86400] {
            let strategy = Strategy::with_ttl(ttl).unwrap();
            assert_eq!(strategy.ttl_seconds(), ttl);
        }
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = Strategy::with_ttl(0);
        assert!(matches!(result, Err(NearbyError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_ttl() {
        assert_eq!(Strategy::default().ttl_seconds(), DEFAULT_TTL_SECONDS);
    }
}
