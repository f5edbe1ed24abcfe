use std::time::Duration;

use log::debug;
#[cfg(test)]
use mockall::automock;

use crate::errors::{Error, Result};
use crate::retry::RetryPolicy;

const USER_AGENT: &str = concat!("sale-board/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) struct FeedHttpClient {
    client: ureq::Agent,
    retry_policy: RetryPolicy,
}

#[cfg_attr(test, automock)]
#[allow(dead_code)]
impl FeedHttpClient {
    pub(crate) fn new(retry_policy: RetryPolicy) -> Self {
        let client = ureq::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build();
        FeedHttpClient {
            client,
            retry_policy,
        }
    }

    /// Fetches `url`, bypassing any HTTP caches on the way.
    pub(crate) fn get(&self, url: &str) -> Result<String> {
        debug!("Loading url '{url}'");
        let response = self.retry_policy.retry(|| self.request(url).call())?;
        debug!(
            "Got {} {} from '{url}'",
            response.status(),
            response.status_text()
        );
        Ok(ensure_success(response)?.into_string()?)
    }
}

impl FeedHttpClient {
    fn request(&self, url: &str) -> ureq::Request {
        self.client
            .get(url)
            .set("Cache-Control", "no-store")
            .set("Pragma", "no-cache")
            .set("Accept", "application/json")
    }
}

/// ureq only reports 4xx and 5xx as errors; an unfollowed redirect or any
/// other non-2xx status must not reach the JSON decoder.
fn ensure_success(response: ureq::Response) -> Result<ureq::Response> {
    let status = response.status();
    if (200..300).contains(&status) {
        return Ok(response);
    }
    Err(Error::Http {
        url: Some(response.get_url().to_string()),
        status: Some(status),
        message: format!("fetch failed: {} {}", status, response.status_text()),
    })
}
