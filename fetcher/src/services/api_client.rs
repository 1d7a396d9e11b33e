//! reqwest client for the registry API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, USER_AGENT};
use serde_json::Value;
use url::Url;

use shared::{stage_debug, ApiFailure, Stage};
use crate::error::{FetchError, FetchResult};
use crate::traits::UpstreamApi;
use crate::types::SearchQuery;

/// Default service root
pub const DEFAULT_BASE_URL: &str = "https://api-fns.ru/api";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const ACCEPT_ANY_JSON: &str = "application/json,text/plain,*/*";

/// Per-endpoint request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTimeouts {
    pub search: Duration,
    pub batch: Duration,
    pub single: Duration,
}

impl Default for EndpointTimeouts {
    fn default() -> Self {
        Self {
            search: Duration::from_secs(30),
            batch: Duration::from_secs(35),
            single: Duration::from_secs(25),
        }
    }
}

/// Real upstream client. Every request carries the API key as the `key`
/// query parameter.
pub struct RealUpstreamApi {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeouts: EndpointTimeouts,
}

impl RealUpstreamApi {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> FetchResult<Self> {
        Self::with_timeouts(base_url, api_key, EndpointTimeouts::default())
    }

    pub fn with_timeouts(
        base_url: &str,
        api_key: impl Into<String>,
        timeouts: EndpointTimeouts,
    ) -> FetchResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::config(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::config(format!("base URL '{base_url}' cannot hold endpoint paths")));
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FetchError::config("API key is empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_ANY_JSON));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            timeouts,
        })
    }

    /// `{base}/{endpoint}`, keeping any path already on the base
    pub fn endpoint_url(&self, endpoint: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint);
        }
        url
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)], timeout: Duration) -> Result<Value, ApiFailure> {
        let url = self.endpoint_url(endpoint);
        stage_debug!(Stage::Run, endpoint, "GET {}", url);

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_failure)?;

        if !status.is_success() {
            return Err(ApiFailure::from_status(status.as_u16(), &body));
        }
        Ok(decode_body(&body))
    }
}

#[async_trait]
impl UpstreamApi for RealUpstreamApi {
    async fn search(&self, query: &SearchQuery) -> Result<Value, ApiFailure> {
        let page = query.page.to_string();
        let mut params = vec![("q", query.query.as_str()), ("page", page.as_str())];
        if let Some(filter) = &query.filter {
            params.push(("filter", filter.as_str()));
        }
        self.get("search", &params, self.timeouts.search).await
    }

    async fn lookup_batch(&self, joined_identifiers: &str) -> Result<Value, ApiFailure> {
        self.get("multinfo", &[("req", joined_identifiers)], self.timeouts.batch)
            .await
    }

    async fn lookup_one(&self, identifier: &str) -> Result<Value, ApiFailure> {
        self.get("egr", &[("req", identifier)], self.timeouts.single).await
    }
}

fn transport_failure(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::Timeout
    } else {
        ApiFailure::Network(error.to_string())
    }
}

/// JSON when the body parses, otherwise the raw text as a string value
pub fn decode_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
