use serde::{Deserialize, Serialize};

/// Control-loop state of a crawl session
///
/// A session starts in `Running` and reaches exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The loop is still pulling tasks from the frontier
    Running,
    /// The frontier emptied naturally
    Drained,
    /// The page budget was hit with tasks still queued
    BudgetExceeded,
    /// The caller's cancellation signal fired
    Aborted,
}

/// Why a crawl session stopped, as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Drained,
    MaxPagesReached,
    MaxDepthReached,
    Aborted,
}

/// One discovered link, recorded for provenance
///
/// Edges are append-only and hold no back-reference to page records.
/// `followed` marks whether the child was accepted into the frontier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdge {
    pub parent: String,
    pub child: String,
    pub followed: bool,
}
