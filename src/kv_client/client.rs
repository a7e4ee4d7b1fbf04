use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Category, ConsistencyIndex, Item};
use crate::types::DashboardError;

use super::api::{BlockingQuery, KeysQuery, PollResponse};
use super::backend::KvBackend;
use super::helpers::{format_wait, parse_index};

/// HTTP client for the dashboard's key/value API.
#[derive(Clone)]
pub struct KvClient {
    http: Client,
    base_url: Url,
    wait: Duration,
    poll_timeout: Duration,
    request_timeout: Duration,
}

impl KvClient {
    /// Prepare an HTTP client for the API configured in `config`.
    pub fn new(config: &Config) -> Result<Self, DashboardError> {
        let base_url = Url::parse(config.api_url.trim()).map_err(|err| {
            DashboardError::Config(format!("Invalid api_url `{}`: {err}", config.api_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "api_url `{}` cannot be used as a base URL",
                config.api_url
            )));
        }

        let http = Client::builder().build().map_err(DashboardError::Http)?;

        Ok(Self {
            http,
            base_url,
            wait: config.wait(),
            poll_timeout: config.poll_timeout(),
            request_timeout: config.request_timeout(),
        })
    }

    /// Fetch the sorted list of category names (`GET /api/?keys`).
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, DashboardError> {
        let response = self
            .get("", &KeysQuery::default(), self.request_timeout)
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                path: response.url().path().to_string(),
                status,
            });
        }
        response.json::<Vec<Category>>().await.map_err(DashboardError::Http)
    }

    /// Issue one blocking query for `category`, returning once the server has
    /// something newer than `index` or its wait bound elapses.
    pub async fn poll_items(
        &self,
        category: &str,
        index: ConsistencyIndex,
    ) -> Result<PollResponse, DashboardError> {
        let query = BlockingQuery {
            recurse: "",
            wait: format_wait(self.wait),
            index: index.value(),
        };
        debug!(category = %category, index = %index, "Issuing blocking query");
        let response = self.get(category, &query, self.poll_timeout).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            // The server answers 404 when the category holds no keys yet.
            let index = parse_index(response.headers()).unwrap_or(index);
            return Ok(PollResponse {
                items: Vec::new(),
                index,
            });
        }
        if !status.is_success() {
            return Err(DashboardError::Status {
                path: response.url().path().to_string(),
                status,
            });
        }

        let Some(new_index) = parse_index(response.headers()) else {
            return Err(DashboardError::Malformed(format!(
                "response for `{category}` has no usable index header"
            )));
        };
        let items = response.json::<Vec<Item>>().await.map_err(|err| {
            warn!(category = %category, error = ?err, "Failed to decode items");
            DashboardError::Malformed(format!("item list for `{category}`: {err}"))
        })?;

        Ok(PollResponse {
            items,
            index: new_index,
        })
    }

    fn endpoint(&self, category: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new(), so segments are always available
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("api").push(category);
        }
        url
    }

    async fn get<Q>(
        &self,
        category: &str,
        query: &Q,
        timeout: Duration,
    ) -> Result<Response, DashboardError>
    where
        Q: Serialize + ?Sized,
    {
        self.http
            .get(self.endpoint(category))
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(DashboardError::Http)
    }
}

#[async_trait]
impl KvBackend for KvClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>, DashboardError> {
        KvClient::fetch_categories(self).await
    }

    async fn poll_items(
        &self,
        category: &str,
        index: ConsistencyIndex,
    ) -> Result<PollResponse, DashboardError> {
        KvClient::poll_items(self, category, index).await
    }
}
