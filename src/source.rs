//! Record source backed by the public products endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::record::Record;

pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products";

/// Errors that can occur while fetching products.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Non success HTTP response.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body is not a product listing.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Which part of the catalog to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryQuery {
    #[default]
    All,
    Category(String),
}

impl CategoryQuery {
    /// Blank input selects the whole catalog.
    pub fn from_input(input: &str) -> Self {
        let category = input.trim();
        if category.is_empty() {
            CategoryQuery::All
        } else {
            CategoryQuery::Category(category.to_string())
        }
    }

    pub fn as_input(&self) -> &str {
        match self {
            CategoryQuery::All => "",
            CategoryQuery::Category(c) => c,
        }
    }
}

/// Supplies the complete, unfiltered record collection.
///
/// Every call returns a whole record set which replaces the previous one.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Record>, FetchError>;

    /// Fetches the records of one category. A blank category behaves
    /// exactly like [`RecordSource::fetch_all`].
    async fn fetch_by_category(&self, category: &str) -> Result<Vec<Record>, FetchError>;

    async fn fetch(&self, query: &CategoryQuery) -> Result<Vec<Record>, FetchError> {
        match query {
            CategoryQuery::All => self.fetch_all().await,
            CategoryQuery::Category(category) => self.fetch_by_category(category).await,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<Record>,
}

/// HTTP client for `GET <root>` and `GET <root>/category/<name>`.
///
/// Requests are issued once, failures are reported to the caller and never
/// retried.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http_client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let parsed =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "{base_url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn category_url(&self, category: &str) -> String {
        format!(
            "{}/category/{}",
            self.base_url,
            urlencoding::encode(category.trim())
        )
    }

    async fn get_products(&self, url: &str) -> Result<Vec<Record>, FetchError> {
        debug!("GET {url}");
        let mut request = self.http_client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let listing: ProductsResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse {
                message: e.to_string(),
                body: Some(body.clone()),
            })?;
        debug!("GET {url} returned {} products", listing.products.len());
        Ok(listing.products)
    }
}

#[async_trait]
impl RecordSource for CatalogClient {
    async fn fetch_all(&self) -> Result<Vec<Record>, FetchError> {
        self.get_products(&self.base_url).await
    }

    async fn fetch_by_category(&self, category: &str) -> Result<Vec<Record>, FetchError> {
        if category.trim().is_empty() {
            return self.fetch_all().await;
        }
        self.get_products(&self.category_url(category)).await
    }
}
