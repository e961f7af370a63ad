//! Crawl orchestrator - the control loop driving one session
//!
//! The orchestrator pulls tasks from the frontier, applies the session
//! policy, dispatches fetches to the collaborator, extracts content and
//! links from each result, and feeds eligible children back into the
//! frontier until it drains, a budget trips, or the caller cancels.
//!
//! One session is logically single-threaded: the frontier, visited set,
//! and fetch counter are only touched from this loop, so they need no
//! locking. Concurrency exists only at the fetch boundary, where up to
//! `max_concurrent_fetches` collaborator calls run at once.

use crate::config::{validate_policy, CrawlPolicy, Settings};
use crate::crawler::cancel::CancelToken;
use crate::crawler::fetcher::{FetchedPage, Fetcher, RenderOptions};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::parser::{ContentExtractor, PlainTextExtractor};
use crate::crawler::special::OverrideTable;
use crate::output::{finalize, CrawlResult};
use crate::state::{LinkEdge, PageRecord, PageStatus, SessionState, SkipReason};
use crate::url::{ensure_scheme, host_of, parse_absolute};
use crate::{HarvestError, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// One crawl request, as received from the API boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Starting URL; `https://` is assumed when no scheme is given
    pub seed_url: String,

    #[serde(default)]
    pub policy: CrawlPolicy,

    #[serde(default)]
    pub render: RenderOptions,
}

impl CrawlRequest {
    /// A request for one seed with default policy and render options
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            policy: CrawlPolicy::default(),
            render: RenderOptions::default(),
        }
    }

    /// A request taking policy and render defaults from a settings snapshot
    pub fn from_settings(seed_url: impl Into<String>, settings: &Settings) -> Self {
        Self {
            seed_url: seed_url.into(),
            policy: settings.crawl.clone(),
            render: RenderOptions::from(&settings.fetch),
        }
    }
}

/// Mutable state of one crawl run
///
/// Created when a request is accepted, mutated only by the orchestrator,
/// and projected into a read-only [`CrawlResult`] at the end.
pub struct CrawlSession {
    pub(crate) policy: CrawlPolicy,
    pub(crate) seed: String,
    pub(crate) pages: Vec<PageRecord>,
    pub(crate) edges: Vec<LinkEdge>,
    pub(crate) state: SessionState,
    pub(crate) depth_rejections: u64,
    pub(crate) budget_rejections: u64,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) elapsed_seconds: f64,
}

/// The crawl control loop, generic over the fetch collaborator
pub struct Orchestrator<F> {
    fetcher: F,
    extractor: Arc<dyn ContentExtractor>,
    overrides: OverrideTable,
}

impl<F: Fetcher> Orchestrator<F> {
    /// Creates an orchestrator with the default text extractor and the
    /// built-in single-document override rules
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(PlainTextExtractor),
            overrides: OverrideTable::builtin(),
        }
    }

    /// Replaces the override table
    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    /// Replaces the clean-text extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Runs one crawl session to completion
    ///
    /// Configuration-time failures (bad policy, bad seed) reject the
    /// session here before any fetch. Per-page fetch failures never do:
    /// they are recorded on the page and the loop continues. The caller
    /// always gets a full result with a stop reason, never a partial
    /// payload.
    pub async fn crawl(&self, request: &CrawlRequest, cancel: &CancelToken) -> Result<CrawlResult> {
        validate_policy(&request.policy)?;

        let seed_raw = ensure_scheme(&request.seed_url);
        let seed = parse_absolute(&seed_raw).map_err(|e| HarvestError::InvalidSeed {
            seed: request.seed_url.clone(),
            source: e,
        })?;

        let mut frontier = Frontier::new(&request.policy)?;
        let mut session = CrawlSession {
            policy: request.policy.clone(),
            seed: seed_raw,
            pages: Vec::new(),
            edges: Vec::new(),
            state: SessionState::Running,
            depth_rejections: 0,
            budget_rejections: 0,
            started_at: Utc::now(),
            elapsed_seconds: 0.0,
        };
        let started = Instant::now();

        tracing::info!(
            "Starting crawl of {} (max_depth={}, max_pages={})",
            session.seed,
            session.policy.max_depth,
            session.policy.max_pages
        );

        let outcome = frontier.offer(CrawlTask {
            url: seed,
            depth: 0,
        });
        if !outcome.accepted() {
            tracing::warn!("Seed URL rejected by policy: {:?}", outcome);
        }

        let concurrency = session.policy.max_concurrent_fetches.max(1) as usize;

        while session.state == SessionState::Running {
            if cancel.is_cancelled() {
                session.state = SessionState::Aborted;
                break;
            }

            let first = match frontier.take() {
                Some(task) => task,
                None => {
                    session.state = SessionState::Drained;
                    break;
                }
            };

            // Budget guard on the dequeue path; remaining tasks are
            // discarded, which is a normal terminal state, not an error
            if !session.policy.per_domain_budget && frontier.fetched() >= session.policy.max_pages {
                session.state = SessionState::BudgetExceeded;
                break;
            }

            let mut batch = vec![first];
            while batch.len() < concurrency {
                match frontier.take() {
                    Some(task) => batch.push(task),
                    None => break,
                }
            }

            let prepared: Vec<(CrawlTask, RenderOptions, bool)> = batch
                .into_iter()
                .map(|task| {
                    let (options, recurse) =
                        self.effective_options(&request.render, task.url.as_str());
                    (task, options, recurse)
                })
                .collect();

            let outcomes = join_all(prepared.iter().map(|(task, options, _)| async move {
                // No new fetch starts after cancellation; in-flight ones
                // in this batch are allowed to complete
                if cancel.is_cancelled() {
                    return None;
                }
                tracing::debug!("Fetching {} (depth {})", task.url, task.depth);
                Some(self.fetcher.fetch(&task.url, options).await)
            }))
            .await;

            for ((task, _, recurse), outcome) in prepared.into_iter().zip(outcomes) {
                match outcome {
                    None => {
                        session.pages.push(PageRecord::skipped(
                            task.url.to_string(),
                            task.depth,
                            SkipReason::Cancelled,
                        ));
                    }
                    Some(Err(error)) => {
                        tracing::warn!("Fetch failed for {}: {}", task.url, error);
                        session.pages.push(PageRecord::failed(
                            task.url.to_string(),
                            task.depth,
                            error.kind(),
                        ));
                    }
                    Some(Ok(page)) => {
                        self.record_success(&mut session, &mut frontier, task, page, recurse);
                    }
                }
            }
        }

        session.depth_rejections = frontier.depth_rejections();
        session.budget_rejections = frontier.budget_rejections();
        session.elapsed_seconds = started.elapsed().as_secs_f64();

        let result = finalize(&session);
        tracing::info!(
            "Crawl finished: {} fetched, {} errored, {} skipped in {:.2}s ({:?})",
            result.summary.fetched,
            result.summary.errored,
            result.summary.skipped,
            result.summary.elapsed_seconds,
            result.summary.stop_reason
        );

        Ok(result)
    }

    /// Applies the override table to the base render options for one URL
    ///
    /// Returns the effective options and whether the page's links are
    /// followed.
    fn effective_options(&self, base: &RenderOptions, url: &str) -> (RenderOptions, bool) {
        match self.overrides.lookup(url) {
            Some(rule) => {
                let mut options = base.clone();
                options.settle_wait = Some(rule.sample_wait());
                (options, rule.recurse())
            }
            None => (base.clone(), true),
        }
    }

    /// Records a successful fetch and feeds its links back to the frontier
    fn record_success(
        &self,
        session: &mut CrawlSession,
        frontier: &mut Frontier,
        task: CrawlTask,
        page: FetchedPage,
        recurse: bool,
    ) {
        let host = host_of(&task.url).unwrap_or_default();
        frontier.mark_fetched(&host);

        let content = self.extractor.extract_clean_text(&page.html);

        if recurse {
            for link in &page.links {
                let outcome = frontier.offer(CrawlTask {
                    url: link.clone(),
                    depth: task.depth + 1,
                });

                if session.policy.record_link_graph {
                    session.edges.push(LinkEdge {
                        parent: task.url.to_string(),
                        child: link.to_string(),
                        followed: outcome.accepted(),
                    });
                }
            }
        } else {
            tracing::debug!("Terminal page {}, links not followed", task.url);
        }

        session.pages.push(PageRecord {
            original_url: task.url.to_string(),
            final_url: page.final_url.to_string(),
            was_redirected: page.was_redirected,
            depth: task.depth,
            status: PageStatus::Ok,
            title: page.title,
            description: page.description,
            content_length: content.len(),
            content,
            elements: page.elements,
            extracted_links: page.links.iter().map(|u| u.to_string()).collect(),
        });
    }
}
