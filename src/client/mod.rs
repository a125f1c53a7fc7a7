//! HTTP client for the catalog API, used by the presentation layer.

pub mod browse;

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::recipes::dto::{Recipe, RecipePage};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request headers too large")]
    HeadersTooLarge,
    #[error("request timed out")]
    Timeout,
    #[error("server responded {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(reqwest::Error),
}

/// Which call failed, for picking the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fetch,
    Search,
}

impl ClientError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e)
        }
    }

    pub fn user_message(&self, action: Action) -> &'static str {
        match (self, action) {
            (Self::HeadersTooLarge, _) => {
                "Request headers too large. Please clear your browser data and try again."
            }
            (Self::Timeout, Action::Fetch) => {
                "Request timeout. Please check if the backend server is running."
            }
            (Self::Timeout, Action::Search) => "Search timeout. Please try again.",
            (_, Action::Fetch) => {
                "Failed to fetch recipes. Please make sure the backend server is running."
            }
            (_, Action::Search) => {
                "Failed to search recipes. Please make sure the backend server is running."
            }
        }
    }
}

/// Filter fields as typed by the user; empty strings are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub title: String,
    pub calories: String,
    pub rating: String,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.calories.is_empty() && self.rating.is_empty()
    }

    fn query(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", self.title.as_str()),
            ("calories", self.calories.as_str()),
            ("rating", self.rating.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }
}

#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET /api/recipes/ starting at row `offset`.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<RecipePage, ClientError> {
        let url = format!("{}/api/recipes/", self.base_url);
        self.get_json(&url, &[("pages", offset), ("limit", limit)]).await
    }

    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Recipe>, ClientError> {
        let url = format!("{}/api/recipes/search/", self.base_url);
        self.get_json(&url, &filters.query()).await
    }

    async fn get_json<Q, T>(&self, url: &str, query: &Q) -> Result<T, ClientError>
    where
        Q: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, "GET");
        let res = self
            .http
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .query(query)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = res.status();
        if status == StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE {
            return Err(ClientError::HeadersTooLarge);
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, %url, "catalog request failed");
            return Err(ClientError::Status { status, body });
        }
        res.json::<T>().await.map_err(ClientError::from_transport)
    }
}
