// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use reqwest::StatusCode;
use thiserror::Error;

/// Reasons a single poll cycle was abandoned.
///
/// None of these stop the scheduler; the previous snapshot stays published.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Error fetching {url}: {status}")]
    Fetch { url: String, status: StatusCode },
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to decode GTFS-rt feed: {0}")]
    Decode(#[from] prost::DecodeError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("feed url must not be empty")]
    EmptyFeedUrl,
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("max history must keep at least one sample")]
    ZeroMaxHistory,
    #[error("invalid client identity header '{0}'")]
    InvalidClientIdentity(String),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
