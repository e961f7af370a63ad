//! Result aggregation and reporting
//!
//! The aggregator is a read-only projection: it never mutates page records,
//! it only assembles them (with a summary) into the result returned to the
//! caller.

mod report;

pub use report::{render_summary, write_json, write_json_to};

use crate::crawler::CrawlSession;
use crate::state::{LinkEdge, PageRecord, SessionState, StopReason};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate counts and termination info for one crawl session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// Pages fetched successfully
    pub fetched: usize,

    /// Pages dequeued but never fetched
    pub skipped: usize,

    /// Pages whose fetch failed
    pub errored: usize,

    pub stop_reason: StopReason,

    pub started_at: DateTime<Utc>,

    pub elapsed_seconds: f64,
}

/// The complete, immutable result of one crawl session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// The seed URL after scheme coercion
    pub seed: String,

    /// Page records in fetch-completion order
    pub pages: Vec<PageRecord>,

    /// Link provenance edges, when the session recorded them
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub edges: Vec<LinkEdge>,

    pub summary: CrawlSummary,
}

/// Projects a finished session into its result
///
/// Purely read-only: counts statuses, maps the terminal state to a stop
/// reason, and copies the records out.
pub fn finalize(session: &CrawlSession) -> CrawlResult {
    let fetched = session.pages.iter().filter(|p| p.status.is_ok()).count();
    let skipped = session.pages.iter().filter(|p| p.status.is_skipped()).count();
    let errored = session.pages.iter().filter(|p| p.status.is_error()).count();

    let stop_reason = match session.state {
        SessionState::Aborted => StopReason::Aborted,
        SessionState::BudgetExceeded => StopReason::MaxPagesReached,
        SessionState::Drained | SessionState::Running => {
            // A natural drain that rejected offers along the way stopped
            // because of the bound that did the rejecting
            if session.budget_rejections > 0 {
                StopReason::MaxPagesReached
            } else if session.depth_rejections > 0 {
                StopReason::MaxDepthReached
            } else {
                StopReason::Drained
            }
        }
    };

    CrawlResult {
        seed: session.seed.clone(),
        pages: session.pages.clone(),
        edges: session.edges.clone(),
        summary: CrawlSummary {
            fetched,
            skipped,
            errored,
            stop_reason,
            started_at: session.started_at,
            elapsed_seconds: session.elapsed_seconds,
        },
    }
}
