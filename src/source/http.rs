//! The live weather.gc.ca feed.

use super::FeedSource;
use crate::error::FetchError;
use crate::forecast::LocationCode;

pub const DEFAULT_BASE_URL: &str = "https://weather.gc.ca";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches `<base>/rss/city/<code>_e.xml` with a blocking GET.
///
/// No timeout or retry policy is applied beyond the client's defaults;
/// callers that need one can wrap this source.
pub struct HttpSource {
    /// Scheme and host the feed is served from, without a trailing slash.
    pub base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// English city feed URL for `code`.
    pub fn feed_url(&self, code: &LocationCode) -> String {
        format!("{}/rss/city/{}_e.xml", self.base_url, code)
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl FeedSource for HttpSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    fn fetch(&self, code: &LocationCode) -> Result<Vec<u8>, FetchError> {
        let url = self.feed_url(code);
        tracing::info!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()?;
        match resp.status() {
            reqwest::StatusCode::OK => Ok(resp.bytes()?.to_vec()),
            status => Err(FetchError::Status(status)),
        }
    }
}
