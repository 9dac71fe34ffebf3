use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// How the remote crawler fetches pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// Plain HTTP fetch
    Http,
    /// Headless browser rendering
    Chrome,
    /// HTTP first, browser when the page needs it
    Smart,
}

/// Format of page content in responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnFormat {
    Raw,
    Markdown,
    Commonmark,
    Html2text,
    Text,
    Bytes,
}

/// Proxy pool selection for outbound request routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyPool {
    /// Entry-level residential pool
    Residential,
    /// 4G/5G mobile exits
    Mobile,
    /// ISP-grade datacenter routing
    Isp,
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_scale_factor: Option<f64>,
    #[serde(default)]
    pub emulating_mobile: bool,
}

/// Webhook delivery settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Where events are delivered
    pub destination: String,
    /// Notify when all credits are depleted
    #[serde(default)]
    pub on_credits_depleted: bool,
    /// Notify on every page found
    #[serde(default)]
    pub on_find: bool,
    /// Notify on website status changes
    #[serde(default)]
    pub on_website_status: bool,
}

/// What a browser-rendered request waits for before capturing the page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaitFor {
    /// Wait for the network to go idle, up to a timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_network: Option<u64>,
    /// Wait until a selector exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<WaitTarget>,
    /// Hard delay in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

/// A selector plus how long to wait for it, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitTarget {
    pub selector: String,
    pub timeout: u64,
}

/// One step of a scripted browser interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum AutomationStep {
    Evaluate { code: String },
    Click { selector: String },
    Wait { duration: u64 },
    WaitFor { selector: String },
    Fill { selector: String, value: String },
    ScrollY { pixels: i32 },
    InfiniteScroll { times: u32 },
}

/// Chunking applied to returned content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkBy {
    /// One of ByWords, ByLines, ByCharacterLength, BySentence
    pub r#type: String,
    /// The amount to chunk by
    pub value: u32,
}

/// Open-ended request parameters merged into POST payloads
///
/// Unset fields are left out of the wire payload entirely. Keys the client
/// does not model can be sent through [`extra`](RequestParams::extra);
/// they are flattened into the top-level payload object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestParams {
    /// How the remote crawler fetches pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestMode>,

    /// Maximum number of pages to visit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Crawl depth from the start URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,

    /// Content format of returned pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_format: Option<ReturnFormat>,

    /// Serve cached copies when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    /// Per-path page budgets, e.g. {"*": 50}
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<HashMap<String, u32>>,

    /// Locale used during the crawl
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Cookie header sent with each page fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,

    /// Use stealth techniques in browser mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stealth: Option<bool>,

    /// Extra headers for each page fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// Enable anti-bot countermeasures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_bot: Option<bool>,

    /// Include page metadata in records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<bool>,

    /// Browser viewport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,

    /// Text encoding override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Also crawl subdomains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<bool>,

    /// User agent for page fetches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Route through a proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_enabled: Option<bool>,

    /// Which proxy pool to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyPool>,

    /// User-supplied proxy endpoint for reduced-cost downloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_proxy: Option<String>,

    /// Honor the target's robots.txt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respect_robots: Option<bool>,

    /// CSS selector that scopes extracted content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_selector: Option<String>,

    /// Fetch page resources (scripts, styles, images) too
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_resources: Option<bool>,

    /// Seed the crawl from the sitemap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<bool>,

    /// External domains to include
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_domains: Option<Vec<String>>,

    /// Include matched links in each record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_page_links: Option<bool>,

    /// Include response headers in each record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_headers: Option<bool>,

    /// Include response cookies in each record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_cookies: Option<bool>,

    /// Remote per-request timeout, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u32>,

    /// Detach the crawl and return immediately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_in_background: Option<bool>,

    /// Webhook delivery settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<WebhookSettings>,

    /// Wait conditions for browser-rendered requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<WaitFor>,

    /// Scripted browser steps per URL path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_scripts: Option<HashMap<String, Vec<AutomationStep>>>,

    /// Chunk returned content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunking_alg: Option<ChunkBy>,

    /// Reduced-cost mode with speed/accuracy trade-offs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lite_mode: Option<bool>,

    /// Forward-compatible escape hatch; keys land at the payload top level
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Parameters for the search operation
///
/// Flattens [`RequestParams`] so crawl tuning applies to the pages fetched
/// for each result. The `search` field itself is set by the client from the
/// query argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(flatten)]
    pub base: RequestParams,

    /// The search query; filled in from the operation argument
    #[serde(default)]
    pub search: String,

    /// Cap on websites crawled from the results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_limit: Option<u32>,

    /// Fetch page content for each result (defaults to true remotely)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_page_content: Option<bool>,

    /// Geographic location bias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Country code bias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Language code bias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Number of search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,

    /// Result page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// One document for the transform operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformInput {
    /// The HTML to transform
    pub html: String,
    /// Source URL, used by readability mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Parameters for the transform operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_format: Option<ReturnFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub readability: Option<bool>,

    /// Strip noise for AI consumption
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,

    /// Also strip navigation, footers, and chrome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_full: Option<bool>,
}

/// Parameters identifying a stored document for the query operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    /// Exact resource URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Website domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Resource path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,
}
