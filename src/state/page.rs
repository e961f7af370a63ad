use serde::{Deserialize, Serialize};

/// Classification of a per-page fetch failure
///
/// Per-page failures are isolated: they are recorded on the page record and
/// never abort the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Page load or connect exceeded its deadline
    Timeout,
    /// Transport-level failure or non-success HTTP status
    Network,
    /// The page could not be rendered into usable content
    Render,
}

/// Why a dequeued task was recorded without being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Cancellation fired after the task was dequeued but before its fetch
    Cancelled,
}

/// Outcome of attempting one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    /// Fetched and extracted successfully
    Ok,
    /// Dequeued but never fetched
    Skipped { reason: SkipReason },
    /// Fetch attempted and failed
    Error { kind: FetchErrorKind },
}

impl PageStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, PageStatus::Ok)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PageStatus::Skipped { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PageStatus::Error { .. })
    }
}

/// Counts of notable element types on a rendered page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub links: usize,
    pub images: usize,
    pub forms: usize,
    pub scripts: usize,
    /// Total element count in the document
    pub total: usize,
}

/// The immutable result of attempting to fetch one URL
///
/// Created once per fetched or skipped URL, owned by the result aggregator,
/// and never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// The URL as it entered the frontier
    pub original_url: String,

    /// The URL after redirects (equals `original_url` when none fired)
    pub final_url: String,

    /// Whether the fetch landed somewhere other than it started
    pub was_redirected: bool,

    /// Distance from the seed, in link hops
    pub depth: u32,

    #[serde(flatten)]
    pub status: PageStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Clean extracted text (empty for skipped/errored pages)
    pub content: String,

    pub content_length: usize,

    pub elements: ElementCounts,

    /// Absolute link URLs discovered on the page, in document order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extracted_links: Vec<String>,
}

impl PageRecord {
    /// Builds a record for a task that failed to fetch
    pub fn failed(original_url: String, depth: u32, kind: FetchErrorKind) -> Self {
        Self {
            final_url: original_url.clone(),
            original_url,
            was_redirected: false,
            depth,
            status: PageStatus::Error { kind },
            title: None,
            description: None,
            content: String::new(),
            content_length: 0,
            elements: ElementCounts::default(),
            extracted_links: Vec::new(),
        }
    }

    /// Builds a record for a task that was dequeued but never fetched
    pub fn skipped(original_url: String, depth: u32, reason: SkipReason) -> Self {
        Self {
            final_url: original_url.clone(),
            original_url,
            was_redirected: false,
            depth,
            status: PageStatus::Skipped { reason },
            title: None,
            description: None,
            content: String::new(),
            content_length: 0,
            elements: ElementCounts::default(),
            extracted_links: Vec::new(),
        }
    }
}
