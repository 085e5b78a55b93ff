// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use crate::errors::ConfigError;
use crate::vehicle_table::RetentionPolicy;
use reqwest::header::{HeaderName, HeaderValue};
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "https://api.entur.io/realtime/v1/gtfs-rt/vehicle-positions";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header used to identify ourselves to the feed operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub header: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub feed_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub client_identity: Option<ClientIdentity>,
    pub retention: RetentionPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client_identity: None,
            retention: RetentionPolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::EmptyFeedUrl);
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }

        if self.retention.max_history == Some(0) {
            return Err(ConfigError::ZeroMaxHistory);
        }

        if let Some(identity) = &self.client_identity {
            let name_ok = HeaderName::from_bytes(identity.header.as_bytes()).is_ok();
            let value_ok = HeaderValue::from_str(&identity.value).is_ok();
            if !name_ok || !value_ok {
                return Err(ConfigError::InvalidClientIdentity(identity.header.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TrackerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let empty_url = TrackerConfig {
            feed_url: String::from("  "),
            ..Default::default()
        };
        assert!(matches!(empty_url.validate(), Err(ConfigError::EmptyFeedUrl)));

        let zero_interval = TrackerConfig {
            poll_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            zero_interval.validate(),
            Err(ConfigError::ZeroPollInterval)
        ));

        let zero_history = TrackerConfig {
            retention: RetentionPolicy {
                max_missed_polls: None,
                max_history: Some(0),
            },
            ..Default::default()
        };
        assert!(matches!(
            zero_history.validate(),
            Err(ConfigError::ZeroMaxHistory)
        ));

        let bad_header = TrackerConfig {
            client_identity: Some(ClientIdentity {
                header: String::from("not a header"),
                value: String::from("lupine"),
            }),
            ..Default::default()
        };
        assert!(matches!(
            bad_header.validate(),
            Err(ConfigError::InvalidClientIdentity(_))
        ));
    }
}
