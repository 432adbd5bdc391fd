//! HTTP client for the daily rates feed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, instrument};

use currencier_types::{Currency, CurrencySource, SourceError, SourceErrorKind};

use crate::feed::decode_feed;

const ACCEPT_XML: &str = "application/xml, text/xml;q=0.9, */*;q=0.1";
const AGENT: &str = concat!("currencier/", env!("CARGO_PKG_VERSION"));

/// Rate source backed by the CBR `XML_daily` endpoint (or any feed in the
/// same format).
pub struct CbrSource {
    url: String,
    client: Client,
}

impl CbrSource {
    /// Creates a source for `url`; every request is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn error(&self, kind: SourceErrorKind) -> SourceError {
        SourceError::new(self.url.clone(), kind)
    }

    async fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let network = |e: reqwest::Error| self.error(SourceErrorKind::Network(e.to_string()));

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, ACCEPT_XML)
            .header(USER_AGENT, AGENT)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?;

        let body = response.bytes().await.map_err(network)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl CurrencySource for CbrSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Vec<Currency>, SourceError> {
        let body = self.fetch().await?;
        debug!("Fetched {} bytes", body.len());

        let currencies = decode_feed(&body).map_err(|kind| self.error(kind))?;
        debug!("Decoded {} currencies", currencies.len());
        Ok(currencies)
    }
}
