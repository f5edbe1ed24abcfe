mod http;

use log::{debug, info};
use mockall_double::double;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{Error, Result};
use crate::feed::Feed;
use crate::retry::RetryPolicy;
#[double]
use http::FeedHttpClient;

pub const DEFAULT_SOURCE: &str = "data/sales.json";

/// Where the feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    Path(PathBuf),
}

impl FromStr for FeedSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("feed source must not be empty".to_string());
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Self::Url(s.to_string()))
        } else {
            Ok(Self::Path(PathBuf::from(s)))
        }
    }
}

impl Default for FeedSource {
    fn default() -> Self {
        Self::Path(PathBuf::from(DEFAULT_SOURCE))
    }
}

impl Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

pub struct FeedLoader {
    source: FeedSource,
    client: FeedHttpClient,
}

impl FeedLoader {
    pub fn new(source: FeedSource, retry_policy: RetryPolicy) -> Self {
        Self::with_client(source, FeedHttpClient::new(retry_policy))
    }

    pub(crate) fn with_client(source: FeedSource, client: FeedHttpClient) -> Self {
        Self { source, client }
    }

    #[cfg(test)]
    pub(crate) fn offline(source: FeedSource) -> Self {
        Self::with_client(source, FeedHttpClient::default())
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    pub fn load(&self) -> Result<Feed> {
        info!("Loading feed from {}", self.source);
        match &self.source {
            FeedSource::Url(url) => {
                let body = self.client.get(url)?;
                debug!("Fetched {} bytes", body.len());
                body.parse()
            }
            FeedSource::Path(path) => {
                let file = File::open(path).map_err(|source| Error::Read {
                    path: path.clone(),
                    source,
                })?;
                Feed::from_reader(BufReader::new(file))
            }
        }
    }
}
