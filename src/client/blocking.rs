//! Blocking client variant
//!
//! Same operation set as the async [`Client`](crate::Client); every call
//! blocks the calling thread for the full network round trip. Callers who
//! want parallelism run instances on separate threads. There is no
//! cancellation: a call runs to completion or returns an error.

use crate::client::{decode_success, error_from_status, merge_payload, url_payload};
use crate::client::{JSON, JSONL, OCTET_STREAM};
use crate::config::ClientConfig;
use crate::params::{
    query_pairs, QueryParams, RequestParams, SearchParams, TransformInput, TransformParams,
};
use crate::stream::Records;
use crate::{ClientError, Result};
use bytes::Bytes;
use reqwest::header;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};

/// Blocking client for the Driftline service
///
/// # Example
///
/// ```no_run
/// use driftline_client::blocking::Client;
///
/// # fn run() -> driftline_client::Result<()> {
/// let client = Client::new(None)?;
/// let page = client.scrape_url("https://example.com", None, "application/json")?;
/// println!("{page}");
/// # Ok(())
/// # }
/// ```
pub struct Client {
    config: ClientConfig,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Creates a client with the given API key, falling back to the
    /// `DRIFTLINE_API_KEY` environment variable.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let mut builder = ClientConfig::builder();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        Self::with_config(builder.build()?)
    }

    /// Creates a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| ClientError::transport("build HTTP client", source))?;
        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ===== Crawl and scrape =====

    /// Crawls a website starting from `url`, fully buffered.
    pub fn crawl_url(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("crawl", &payload, content_type)
    }

    /// Crawls a website, yielding records as the server emits them.
    ///
    /// The iterator is lazy, finite, and single-pass.
    pub fn crawl_url_records(
        &self,
        url: &str,
        params: Option<&RequestParams>,
    ) -> Result<Records<reqwest::blocking::Response>> {
        let action = "post to crawl";
        let payload = url_payload(url, params);
        let response = self.dispatch(Method::POST, "crawl", Some(&payload), &[], JSONL, action)?;
        Ok(Records::new(response, action))
    }

    /// Crawls a website, invoking `callback` once per streamed record.
    pub fn crawl_url_each<F>(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        mut callback: F,
    ) -> Result<usize>
    where
        F: FnMut(Value),
    {
        let mut delivered = 0;
        for record in self.crawl_url_records(url, params)? {
            callback(record?);
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Scrapes a single page: a crawl with an effective limit of one.
    ///
    /// The page limit is forced to 1 even when `params` carries another
    /// value.
    pub fn scrape_url(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let mut payload = url_payload(url, params);
        payload.insert("limit".to_string(), Value::from(1));
        self.post_json("crawl", &payload, content_type)
    }

    // ===== Page-level operations =====

    /// Collects the links found at `url`.
    pub fn links(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("links", &payload, content_type)
    }

    /// Captures a screenshot of `url`.
    pub fn screenshot(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("screenshot", &payload, content_type)
    }

    /// Runs a web search and gathers the result pages.
    pub fn search(
        &self,
        query: &str,
        params: Option<SearchParams>,
        content_type: &str,
    ) -> Result<Value> {
        let mut params = params.unwrap_or_default();
        params.search = query.to_string();
        self.post_json("search", &params, content_type)
    }

    /// Transforms raw HTML documents to markdown or text server-side.
    pub fn transform(
        &self,
        data: &[TransformInput],
        params: Option<&TransformParams>,
        content_type: &str,
    ) -> Result<Value> {
        let mut required = Map::new();
        if let Ok(documents) = serde_json::to_value(data) {
            required.insert("data".to_string(), documents);
        }
        let payload = merge_payload(required, params);
        self.post_json("transform", &payload, content_type)
    }

    /// Extracts contact information from `url`.
    pub fn extract_contacts(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("pipeline/extract-contacts", &payload, content_type)
    }

    /// Labels the data extracted from `url`.
    pub fn label(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("pipeline/label", &payload, content_type)
    }

    // ===== Account and stored data =====

    /// Reports the active crawl state for a website.
    pub fn crawl_state(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("data/crawl_state", &payload, content_type)
    }

    /// Returns the account's remaining credits.
    pub fn credits(&self) -> Result<Value> {
        self.get_json("data/credits", &[])
    }

    /// Inserts a record into a stored-data table.
    pub fn data_post<T: Serialize>(&self, table: &str, data: &T) -> Result<Value> {
        self.post_json(&format!("data/{table}"), data, JSON)
    }

    /// Reads records from a stored-data table.
    pub fn data_get(&self, table: &str, params: Option<&RequestParams>) -> Result<Value> {
        let query = params.map(query_pairs).unwrap_or_default();
        self.get_json(&format!("data/{table}"), &query)
    }

    /// Deletes records from a stored-data table.
    pub fn data_delete(&self, table: &str, params: Option<&RequestParams>) -> Result<Value> {
        let endpoint = format!("data/{table}");
        let action = format!("delete from {endpoint}");
        let query = params.map(query_pairs).unwrap_or_default();
        let response =
            self.dispatch(Method::DELETE, &endpoint, None::<&()>, &query, JSON, &action)?;
        self.read_body(response, &action)
    }

    /// Looks up a stored document by URL, domain, or path.
    pub fn query(&self, params: &QueryParams) -> Result<Value> {
        self.get_json("data/query", &query_pairs(params))
    }

    /// Downloads stored page content as raw bytes.
    pub fn download(&self, params: &QueryParams) -> Result<Bytes> {
        let action = "get from data/download";
        let response = self.dispatch(
            Method::GET,
            "data/download",
            None::<&()>,
            &query_pairs(params),
            OCTET_STREAM,
            action,
        )?;
        response
            .bytes()
            .map_err(|source| ClientError::transport(action, source))
    }

    /// Issues a time-limited pre-authorized download link for stored
    /// content.
    pub fn signed_url(&self, params: &QueryParams) -> Result<Value> {
        self.get_json("data/sign-url", &query_pairs(params))
    }

    // ===== Dispatch plumbing =====

    fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
        content_type: &str,
    ) -> Result<Value> {
        let action = format!("post to {endpoint}");
        let response =
            self.dispatch(Method::POST, endpoint, Some(payload), &[], content_type, &action)?;
        self.read_body(response, &action)
    }

    fn get_json(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value> {
        let action = format!("get from {endpoint}");
        let response = self.dispatch(Method::GET, endpoint, None::<&()>, query, JSON, &action)?;
        self.read_body(response, &action)
    }

    fn dispatch<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&T>,
        query: &[(String, String)],
        content_type: &str,
        action: &str,
    ) -> Result<reqwest::blocking::Response> {
        let url = self.config.endpoint_url(endpoint);
        let retry = &self.config.retry;
        let mut attempt: u32 = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .header(header::USER_AGENT, &self.config.user_agent)
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", self.config.api_key),
                )
                .header(header::CONTENT_TYPE, content_type);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(payload) = payload {
                request = request.json(payload);
            }

            tracing::debug!(%url, attempt, "dispatching {action}");
            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    if retry.retry_server_errors
                        && status.is_server_error()
                        && retry.should_retry(attempt)
                    {
                        tracing::debug!(%status, attempt, "server error, backing off");
                        std::thread::sleep(retry.backoff(attempt));
                        attempt += 1;
                        continue;
                    }
                    if status.is_success() {
                        return Ok(response);
                    }
                    let content_type = header_str(&response, header::CONTENT_TYPE);
                    let body = response.text().unwrap_or_default();
                    return Err(error_from_status(action, status.as_u16(), &content_type, &body));
                }
                Err(source) => {
                    if retry.should_retry(attempt) {
                        tracing::debug!(error = %source, attempt, "transport failure, backing off");
                        std::thread::sleep(retry.backoff(attempt));
                        attempt += 1;
                        continue;
                    }
                    return Err(ClientError::transport(action, source));
                }
            }
        }
    }

    fn read_body(&self, response: reqwest::blocking::Response, action: &str) -> Result<Value> {
        let content_type = header_str(&response, header::CONTENT_TYPE);
        let body = response
            .text()
            .map_err(|source| ClientError::transport(action, source))?;
        decode_success(action, &content_type, &body)
    }
}

fn header_str(response: &reqwest::blocking::Response, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
