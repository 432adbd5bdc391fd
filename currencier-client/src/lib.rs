//! # Currencier Client SDK
//!
//! A typed Rust client for the currency rates read API.

use currencier_types::Currency;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Currencier API client.
pub struct CurrencierClient {
    base_url: String,
    http: Client,
}

impl CurrencierClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(self.url(&["health"])?)
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Offset pagination; `None` leaves the server default in place.
    pub async fn currencies(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Currency>, ClientError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        self.get(self.url(&["currencies"])?, &query).await
    }

    /// Cursor pagination: currencies with id greater than `last_id`.
    pub async fn lazy_currencies(
        &self,
        limit: Option<u32>,
        last_id: Option<&str>,
    ) -> Result<Vec<Currency>, ClientError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(last_id) = last_id {
            query.push(("lastid", last_id.to_string()));
        }
        self.get(self.url(&["lazycurrencies"])?, &query).await
    }

    /// Gets a currency by id; `None` when the server has no such record.
    pub async fn currency(&self, id: &str) -> Result<Option<Currency>, ClientError> {
        self.get(self.url(&["currency", id])?, &[]).await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            // Error bodies are plain text.
            let message = resp.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CurrencierClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CurrencierClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_id_is_a_single_encoded_segment() {
        let client = CurrencierClient::new("http://localhost:3000/");
        let url = client.url(&["currency", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/currency/a%2Fb%3Fc%23d");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = CurrencierClient::new("http://localhost:3000/rates");
        let url = client.url(&["currency", "USD"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/rates/currency/USD");
    }

    #[test]
    fn test_empty_id_keeps_trailing_slash() {
        let client = CurrencierClient::new("http://localhost:3000");
        let url = client.url(&["currency", ""]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/currency/");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = CurrencierClient::new("not a url");
        assert!(matches!(client.url(&["health"]), Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: 400,
            message: "must be id in query".into(),
        };
        assert_eq!(err.to_string(), "API error: 400 - must be id in query");
    }
}
