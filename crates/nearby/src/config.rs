// Environment-driven configuration for the session manager

use crate::strategy::DEFAULT_TTL_SECONDS;
use crate::{NearbyError, Result, Strategy};
use serde::Deserialize;
use std::env;

/// Default number of events buffered for observers
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// TTL for publish and subscribe sessions, in whole seconds
    pub ttl_seconds: u32,
    /// Capacity of the observer event channel
    pub event_capacity: usize,
}

impl DiscoveryConfig {
    pub fn from_env() -> Result<Self> {
        let ttl_seconds = env::var("NEARBY_TTL_SECONDS")
            .unwrap_or_else(|_| DEFAULT_TTL_SECONDS.to_string())
            .parse()
            .map_err(|e| NearbyError::InvalidConfig(format!("NEARBY_TTL_SECONDS: {}", e)))?;
        let event_capacity = env::var("NEARBY_EVENT_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_EVENT_CAPACITY.to_string())
            .parse()
            .map_err(|e| NearbyError::InvalidConfig(format!("NEARBY_EVENT_CAPACITY: {}", e)))?;

        Ok(Self {
            ttl_seconds,
            event_capacity,
        })
    }

    /// Build the validated discovery strategy
    pub fn strategy(&self) -> Result<Strategy> {
        Strategy::with_ttl(self.ttl_seconds)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.ttl_seconds, DEFAULT_TTL_SECONDS);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(
            config.strategy().unwrap().ttl_seconds(),
            DEFAULT_TTL_SECONDS
        );
    }

    #[test]
    fn test_zero_ttl_is_rejected_at_strategy_construction() {
        let config = DiscoveryConfig {
            ttl_seconds: 0,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        };
        assert!(matches!(
            config.strategy(),
            Err(NearbyError::InvalidConfig(_))
        ));
    }
}
