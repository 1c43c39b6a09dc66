use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, EXPIRES, IF_MODIFIED_SINCE, PRAGMA};

use crate::catalog::loader::{CatalogFetcher, CatalogLoadError, FetchMode};

/// Fetches the catalog over HTTP.
///
/// The first attempt appends a cache-busting query and sends no-cache
/// headers. The retry is a plain GET.
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>) -> Result<Self, CatalogLoadError> {
        let client = Client::builder()
            .user_agent("starmap-navigator/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| CatalogLoadError::Fetch(err.to_string()))?;
        Ok(HttpFetcher {
            client,
            url: url.into(),
        })
    }

    fn cache_busted_url(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let nonce: u32 = rand::rng().random();
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}v={millis}&r={nonce:x}&nocache=1", self.url)
    }
}

impl CatalogFetcher for HttpFetcher {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self, mode: FetchMode) -> Result<String, CatalogLoadError> {
        let request = match mode {
            FetchMode::NoCache => self
                .client
                .get(self.cache_busted_url())
                .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate, max-age=0")
                .header(PRAGMA, "no-cache")
                .header(EXPIRES, "0")
                .header(IF_MODIFIED_SINCE, "Thu, 01 Jan 1970 00:00:00 GMT"),
            FetchMode::Plain => self.client.get(&self.url),
        };
        request
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|err| CatalogLoadError::Fetch(err.to_string()))
    }
}
