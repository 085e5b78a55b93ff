// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use crate::config::{ClientIdentity, TrackerConfig};
use crate::errors::{ConfigError, PollError};
use bytes::Bytes;
use std::future::Future;

/// Where raw GTFS-rt bytes come from.
pub trait FeedSource: Send + Sync + 'static {
    fn url(&self) -> &str;

    fn fetch(&self) -> impl Future<Output = Result<Bytes, PollError>> + Send;
}

pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
    client_identity: Option<ClientIdentity>,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        HttpFeedSource {
            client,
            url: url.into(),
            client_identity: None,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(HttpFeedSource {
            client,
            url: config.feed_url.clone(),
            client_identity: config.client_identity.clone(),
        })
    }
}

impl FeedSource for HttpFeedSource {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Bytes, PollError> {
        let mut request = self.client.get(&self.url);

        if let Some(identity) = &self.client_identity {
            request = request.header(identity.header.as_str(), identity.value.as_str());
        }

        let response = request.send().await.map_err(|source| PollError::Transport {
            url: self.url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Fetch {
                url: self.url.clone(),
                status,
            });
        }

        response.bytes().await.map_err(|source| PollError::Transport {
            url: self.url.clone(),
            source,
        })
    }
}
