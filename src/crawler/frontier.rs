//! Frontier queue and visited set
//!
//! The frontier is the ordered set of not-yet-fetched (URL, depth) work
//! items for one crawl session. Admission control lives entirely in
//! `offer`: depth bound, page budget, canonical-URL dedup, domain policy,
//! and pattern exclusion, applied in that order. Acceptance marks the URL
//! seen in the same call, so a URL discovered by two parent pages can only
//! be queued once.

use crate::config::CrawlPolicy;
use crate::url::{canonical_key, host_of, DomainPolicy, PatternFilter};
use crate::ConfigError;
use std::collections::{HashMap, HashSet, VecDeque};
use url::Url;

/// One pending unit of crawl work
#[derive(Debug, Clone)]
pub struct CrawlTask {
    /// The URL to fetch (absolute)
    pub url: Url,

    /// Link distance from the seed
    pub depth: u32,
}

/// Result of offering a task to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Queued; the canonical URL is now marked seen
    Accepted,
    /// Task depth exceeds the policy's max depth
    DepthExceeded,
    /// Accepting would overrun the page budget
    BudgetExhausted,
    /// The canonical URL was already queued or fetched this session
    AlreadySeen,
    /// The host is outside the traversal policy
    DomainDenied,
    /// The URL matches a configured exclusion pattern
    PatternExcluded,
    /// The URL has no host component
    MissingHost,
}

impl OfferOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, OfferOutcome::Accepted)
    }
}

/// FIFO work queue with admission control for one crawl session
///
/// Traversal is breadth-first: tasks dequeue in insertion order, so depth
/// is non-decreasing across `take` calls.
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    seen: HashSet<String>,

    /// Successful fetches so far (session-wide)
    fetched: u32,

    /// Queued-but-unfetched counts per host (per-domain budget mode)
    domain_pending: HashMap<String, u32>,

    /// Successful fetches per host (per-domain budget mode)
    domain_fetched: HashMap<String, u32>,

    max_depth: u32,
    max_pages: u32,
    per_domain_budget: bool,
    ignore_query_strings: bool,

    domains: DomainPolicy,
    filter: PatternFilter,

    depth_rejections: u64,
    budget_rejections: u64,
}

impl Frontier {
    /// Builds a frontier from a policy snapshot
    ///
    /// Exclusion patterns compile here; a malformed pattern rejects the
    /// session before any fetch.
    pub fn new(policy: &CrawlPolicy) -> Result<Self, ConfigError> {
        let filter = PatternFilter::compile(&policy.exclude_url_patterns)?;
        let domains = DomainPolicy::new(
            policy.restrict_to_domains.iter(),
            policy.follow_external_links,
        );

        Ok(Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            fetched: 0,
            domain_pending: HashMap::new(),
            domain_fetched: HashMap::new(),
            max_depth: policy.max_depth,
            max_pages: policy.max_pages,
            per_domain_budget: policy.per_domain_budget,
            ignore_query_strings: policy.ignore_query_strings,
            domains,
            filter,
            depth_rejections: 0,
            budget_rejections: 0,
        })
    }

    /// Offers a task for admission
    ///
    /// Checks run in a fixed order; the first failing check names the
    /// rejection. Rejected offers are not errors, they are silently
    /// excluded from traversal.
    pub fn offer(&mut self, task: CrawlTask) -> OfferOutcome {
        if task.depth > self.max_depth {
            self.depth_rejections += 1;
            return OfferOutcome::DepthExceeded;
        }

        let host = match host_of(&task.url) {
            Some(h) => h,
            None => return OfferOutcome::MissingHost,
        };

        if !self.budget_admits(&host) {
            self.budget_rejections += 1;
            return OfferOutcome::BudgetExhausted;
        }

        let key = canonical_key(&task.url, self.ignore_query_strings);
        if self.seen.contains(&key) {
            return OfferOutcome::AlreadySeen;
        }

        if !self.domains.permits(&host) {
            tracing::debug!("Skipping {}: host {} not permitted", task.url, host);
            return OfferOutcome::DomainDenied;
        }

        if self.filter.is_excluded(task.url.as_str()) {
            tracing::debug!("Skipping {}: matches exclusion pattern", task.url);
            return OfferOutcome::PatternExcluded;
        }

        // Mark seen at acceptance, not at fetch completion: this closes the
        // window where two parents discover the same URL
        self.seen.insert(key);
        *self.domain_pending.entry(host).or_default() += 1;
        self.queue.push_back(task);

        OfferOutcome::Accepted
    }

    /// Dequeues the earliest-queued task, or None when drained
    pub fn take(&mut self) -> Option<CrawlTask> {
        let task = self.queue.pop_front()?;

        if let Some(host) = host_of(&task.url) {
            if let Some(pending) = self.domain_pending.get_mut(&host) {
                *pending = pending.saturating_sub(1);
            }
        }

        Some(task)
    }

    /// Records one successful fetch against the budget
    pub fn mark_fetched(&mut self, host: &str) {
        self.fetched += 1;
        *self.domain_fetched.entry(host.to_lowercase()).or_default() += 1;
    }

    fn budget_admits(&self, host: &str) -> bool {
        if self.per_domain_budget {
            let committed = self.domain_pending.get(host).copied().unwrap_or(0)
                + self.domain_fetched.get(host).copied().unwrap_or(0);
            committed < self.max_pages
        } else {
            (self.fetched as usize) + self.queue.len() < self.max_pages as usize
        }
    }

    /// Successful fetches so far
    pub fn fetched(&self) -> u32 {
        self.fetched
    }

    /// Queued tasks awaiting fetch
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Offers rejected for depth, for stop-reason reporting
    pub fn depth_rejections(&self) -> u64 {
        self.depth_rejections
    }

    /// Offers rejected for budget, for stop-reason reporting
    pub fn budget_rejections(&self) -> u64 {
        self.budget_rejections
    }
}
