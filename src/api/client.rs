use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::api::types::RawProduct;
use crate::config::Config;
use crate::error::FetchError;

/// Somewhere product records can be fetched from.
#[async_trait]
pub trait ProductSource: Send + Sync {
  /// Fetch the full product list. No retries happen at this layer.
  async fn fetch_all(&self) -> Result<Vec<RawProduct>, FetchError>;
}

/// Product API client over HTTP
#[derive(Clone)]
pub struct HttpProductSource {
  client: reqwest::Client,
  url: Url,
}

impl HttpProductSource {
  pub fn new(config: &Config) -> Result<Self> {
    let url = config.endpoint_url()?;
    Self::with_url(url, Duration::from_secs(config.api.timeout_secs))
  }

  pub fn with_url(url: Url, timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, url })
  }

  pub fn url(&self) -> &Url {
    &self.url
  }
}

#[async_trait]
impl ProductSource for HttpProductSource {
  async fn fetch_all(&self) -> Result<Vec<RawProduct>, FetchError> {
    debug!(url = %self.url, "fetching products");

    let response = self
      .client
      .get(self.url.clone())
      .send()
      .await
      .map_err(classify_transport_error)?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Server { status });
    }

    let products: Vec<RawProduct> = response.json().await.map_err(classify_transport_error)?;
    debug!(count = products.len(), "fetched products");

    Ok(products)
  }
}

/// Map a reqwest failure onto the fetch error taxonomy. Only "could not reach
/// the host" is a connectivity failure; once the host has answered, anything
/// else is a failed request.
fn classify_transport_error(err: reqwest::Error) -> FetchError {
  if err.is_connect() || err.is_timeout() {
    FetchError::Connectivity(err)
  } else if let Some(status) = err.status() {
    FetchError::Server { status }
  } else if err.is_decode() || err.is_body() {
    FetchError::Decode(err)
  } else {
    FetchError::Request(err)
  }
}
