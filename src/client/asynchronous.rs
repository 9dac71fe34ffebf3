use crate::client::{decode_success, error_from_status, merge_payload, url_payload};
use crate::client::{JSON, JSONL, OCTET_STREAM};
use crate::config::ClientConfig;
use crate::params::{
    query_pairs, QueryParams, RequestParams, SearchParams, TransformInput, TransformParams,
};
use crate::stream::RecordStream;
use crate::{ClientError, Result};
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};

/// Asynchronous client for the Driftline service
///
/// Holds the credential and a persistent connection pool, opened at
/// construction and released when the client is dropped. The client is
/// cheap to share behind a reference; all operations take `&self` and the
/// pool is safe for concurrent use.
///
/// # Example
///
/// ```no_run
/// use driftline_client::Client;
///
/// # async fn run() -> driftline_client::Result<()> {
/// let client = Client::new(None)?; // key from DRIFTLINE_API_KEY
/// let page = client.scrape_url("https://example.com", None, "application/json").await?;
/// println!("{page}");
/// # Ok(())
/// # }
/// ```
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
    closed: AtomicBool,
}

impl Client {
    /// Creates a client with the given API key, falling back to the
    /// `DRIFTLINE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// [`ClientError::MissingApiKey`] when neither source provides a key.
    /// No network activity happens here beyond pool setup.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let mut builder = ClientConfig::builder();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        Self::with_config(builder.build()?)
    }

    /// Creates a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| ClientError::transport("build HTTP client", source))?;
        Ok(Self {
            config,
            http,
            closed: AtomicBool::new(false),
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shuts the client for further use.
    ///
    /// Any operation invoked afterwards fails with [`ClientError::Closed`].
    /// In-flight requests are unaffected; the pool itself is released when
    /// the last reference drops.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::Closed);
        }
        Ok(())
    }

    // ===== Crawl and scrape =====

    /// Crawls a website starting from `url`, fully buffered.
    pub async fn crawl_url(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("crawl", &payload, content_type).await
    }

    /// Crawls a website, yielding records as the server emits them.
    ///
    /// The returned stream is lazy, finite, and single-pass; to restart,
    /// issue a new request. See [`RecordStream`].
    pub async fn crawl_url_stream(
        &self,
        url: &str,
        params: Option<&RequestParams>,
    ) -> Result<RecordStream> {
        let action = "post to crawl";
        let payload = url_payload(url, params);
        let response = self
            .dispatch(Method::POST, "crawl", Some(&payload), &[], JSONL, action)
            .await?;
        Ok(RecordStream::new(response, action))
    }

    /// Crawls a website, invoking `callback` once per streamed record.
    ///
    /// Returns the number of records delivered. Decode failures on single
    /// lines are skipped inside the stream; panics inside the callback are
    /// not caught.
    pub async fn crawl_url_each<F>(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        mut callback: F,
    ) -> Result<usize>
    where
        F: FnMut(Value),
    {
        let mut stream = self.crawl_url_stream(url, params).await?;
        let mut delivered = 0;
        while let Some(record) = stream.next().await {
            callback(record?);
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Scrapes a single page: a crawl with an effective limit of one.
    ///
    /// The page limit is forced to 1 even when `params` carries another
    /// value.
    pub async fn scrape_url(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let mut payload = url_payload(url, params);
        payload.insert("limit".to_string(), Value::from(1));
        self.post_json("crawl", &payload, content_type).await
    }

    // ===== Page-level operations =====

    /// Collects the links found at `url`.
    pub async fn links(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("links", &payload, content_type).await
    }

    /// Captures a screenshot of `url`.
    pub async fn screenshot(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("screenshot", &payload, content_type).await
    }

    /// Runs a web search and gathers the result pages.
    pub async fn search(
        &self,
        query: &str,
        params: Option<SearchParams>,
        content_type: &str,
    ) -> Result<Value> {
        let mut params = params.unwrap_or_default();
        params.search = query.to_string();
        self.post_json("search", &params, content_type).await
    }

    /// Transforms raw HTML documents to markdown or text server-side.
    pub async fn transform(
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
        self.post_json("transform", &payload, content_type).await
    }

    /// Extracts contact information from `url`.
    pub async fn extract_contacts(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("pipeline/extract-contacts", &payload, content_type)
            .await
    }

    /// Labels the data extracted from `url`.
    pub async fn label(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("pipeline/label", &payload, content_type)
            .await
    }

    // ===== Account and stored data =====

    /// Reports the active crawl state for a website.
    pub async fn crawl_state(
        &self,
        url: &str,
        params: Option<&RequestParams>,
        content_type: &str,
    ) -> Result<Value> {
        let payload = url_payload(url, params);
        self.post_json("data/crawl_state", &payload, content_type)
            .await
    }

    /// Returns the account's remaining credits.
    pub async fn credits(&self) -> Result<Value> {
        self.get_json("data/credits", &[]).await
    }

    /// Inserts a record into a stored-data table.
    pub async fn data_post<T: Serialize>(&self, table: &str, data: &T) -> Result<Value> {
        self.post_json(&format!("data/{table}"), data, JSON).await
    }

    /// Reads records from a stored-data table.
    pub async fn data_get(&self, table: &str, params: Option<&RequestParams>) -> Result<Value> {
        let query = params.map(query_pairs).unwrap_or_default();
        self.get_json(&format!("data/{table}"), &query).await
    }

    /// Deletes records from a stored-data table.
    pub async fn data_delete(&self, table: &str, params: Option<&RequestParams>) -> Result<Value> {
        let endpoint = format!("data/{table}");
        let action = format!("delete from {endpoint}");
        let query = params.map(query_pairs).unwrap_or_default();
        let response = self
            .dispatch(Method::DELETE, &endpoint, None::<&()>, &query, JSON, &action)
            .await?;
        self.read_body(response, &action).await
    }

    /// Looks up a stored document by URL, domain, or path.
    pub async fn query(&self, params: &QueryParams) -> Result<Value> {
        self.get_json("data/query", &query_pairs(params)).await
    }

    /// Downloads stored page content as raw bytes.
    pub async fn download(&self, params: &QueryParams) -> Result<Bytes> {
        let action = "get from data/download";
        let response = self
            .dispatch(
                Method::GET,
                "data/download",
                None::<&()>,
                &query_pairs(params),
                OCTET_STREAM,
                action,
            )
            .await?;
        response
            .bytes()
            .await
            .map_err(|source| ClientError::transport(action, source))
    }

    /// Issues a time-limited pre-authorized download link for stored
    /// content.
    pub async fn signed_url(&self, params: &QueryParams) -> Result<Value> {
        self.get_json("data/sign-url", &query_pairs(params)).await
    }

    // ===== Dispatch plumbing =====

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
        content_type: &str,
    ) -> Result<Value> {
        let action = format!("post to {endpoint}");
        let response = self
            .dispatch(Method::POST, endpoint, Some(payload), &[], content_type, &action)
            .await?;
        self.read_body(response, &action).await
    }

    async fn get_json(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value> {
        let action = format!("get from {endpoint}");
        let response = self
            .dispatch(Method::GET, endpoint, None::<&()>, query, JSON, &action)
            .await?;
        self.read_body(response, &action).await
    }

    /// Sends one request under the retry policy and classifies the final
    /// status, returning the response only on success.
    async fn dispatch<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&T>,
        query: &[(String, String)],
        content_type: &str,
        action: &str,
    ) -> Result<reqwest::Response> {
        self.ensure_open()?;
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
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if retry.retry_server_errors
                        && status.is_server_error()
                        && retry.should_retry(attempt)
                    {
                        tracing::debug!(%status, attempt, "server error, backing off");
                        tokio::time::sleep(retry.backoff(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    if status.is_success() {
                        return Ok(response);
                    }
                    let content_type = header_str(&response, header::CONTENT_TYPE);
                    let body = response.text().await.unwrap_or_default();
                    return Err(error_from_status(action, status.as_u16(), &content_type, &body));
                }
                Err(source) => {
                    // The retry policy is blind to the transport failure's
                    // kind; every send error qualifies.
                    if retry.should_retry(attempt) {
                        tracing::debug!(error = %source, attempt, "transport failure, backing off");
                        tokio::time::sleep(retry.backoff(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(ClientError::transport(action, source));
                }
            }
        }
    }

    async fn read_body(&self, response: reqwest::Response, action: &str) -> Result<Value> {
        let content_type = header_str(&response, header::CONTENT_TYPE);
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::transport(action, source))?;
        decode_success(action, &content_type, &body)
    }
}

fn header_str(response: &reqwest::Response, name: header::HeaderName) -> String {
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
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
