use serde::{Deserialize, Serialize};

fn default_max_depth() -> u32 {
    1
}

fn default_max_pages() -> u32 {
    10
}

fn default_concurrency() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "chrome-windows".to_string()
}

fn default_page_load_timeout() -> u64 {
    30
}

fn default_dynamic_wait() -> f64 {
    2.0
}

fn default_min_wait() -> f64 {
    5.0
}

fn default_max_wait() -> f64 {
    8.0
}

/// Traversal policy for one crawl session
///
/// Immutable for the lifetime of a session: the orchestrator receives a
/// snapshot at session creation and never re-reads shared settings
/// mid-crawl. Field names match the wire format of the crawl request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPolicy {
    /// Maximum link distance from the seed (seed itself is depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Page budget: total fetches per session, or per host when
    /// `per_domain_budget` is set
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Apply `max_pages` independently to each distinct host
    #[serde(default)]
    pub per_domain_budget: bool,

    /// Hosts eligible for traversal (empty = no restriction); subdomains
    /// of an entry match
    #[serde(default)]
    pub restrict_to_domains: Vec<String>,

    /// Traverse hosts outside the restriction list
    #[serde(default)]
    pub follow_external_links: bool,

    /// Drop query strings when deciding whether a URL was already visited
    #[serde(default = "default_true")]
    pub ignore_query_strings: bool,

    /// Regex patterns excluding URLs from traversal, evaluated in order
    #[serde(default)]
    pub exclude_url_patterns: Vec<String>,

    /// Upper bound on concurrently dispatched fetches
    #[serde(default = "default_concurrency")]
    pub max_concurrent_fetches: u32,

    /// Collect the parent/child link edge list alongside page records
    #[serde(default)]
    pub record_link_graph: bool,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            per_domain_budget: false,
            restrict_to_domains: Vec::new(),
            follow_external_links: false,
            ignore_query_strings: true,
            exclude_url_patterns: Vec::new(),
            max_concurrent_fetches: default_concurrency(),
            record_link_graph: false,
        }
    }
}

/// Defaults applied to fetches when the request does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchDefaults {
    /// Key into the user-agent catalog
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page load deadline in seconds
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout: u64,

    /// Seconds a rendering backend waits for dynamic content
    #[serde(default = "default_dynamic_wait")]
    pub dynamic_content_wait: f64,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_true")]
    pub disable_images: bool,
}

impl Default for FetchDefaults {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            page_load_timeout: default_page_load_timeout(),
            dynamic_content_wait: default_dynamic_wait(),
            headless: true,
            disable_images: true,
        }
    }
}

/// One entry in the single-document destination table
///
/// URLs matching `pattern` get an extra settle wait sampled from
/// `[min_wait, max_wait]` seconds, and their links are only followed when
/// `recurse` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub pattern: String,

    #[serde(default = "default_min_wait")]
    pub min_wait: f64,

    #[serde(default = "default_max_wait")]
    pub max_wait: f64,

    #[serde(default)]
    pub recurse: bool,
}

/// Root settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub crawl: CrawlPolicy,

    #[serde(default)]
    pub fetch: FetchDefaults,

    /// `[[override]]` tables; empty means the built-in rules apply
    #[serde(default, rename = "override")]
    pub overrides: Vec<OverrideEntry>,
}
