use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    Http {
        url: Option<String>,
        status: Option<u16>,
        message: String,
    },
    #[error("Io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Invalid feed: {0}")]
    Feed(String),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => Self::Http {
                url: Some(response.get_url().to_string()),
                status: Some(code),
                message: format!("fetch failed: {} {}", code, response.status_text()),
            },
            ureq::Error::Transport(transport) => Self::Http {
                url: transport.url().map(|u| u.to_string()),
                status: None,
                message: format!("fetch failed: {transport}"),
            },
        }
    }
}
