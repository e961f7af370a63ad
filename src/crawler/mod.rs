//! Crawler module: the orchestrated crawl loop and its collaborators
//!
//! This module contains the core crawling machinery:
//! - The frontier work queue with admission control and dedup
//! - The fetch collaborator seam and its HTTP implementation
//! - HTML parsing and clean-text extraction
//! - The single-document destination override table
//! - The orchestrator control loop tying it all together

mod cancel;
mod fetcher;
mod frontier;
mod orchestrator;
mod parser;
mod special;

pub use cancel::CancelToken;
pub use fetcher::{
    resolve_user_agent, FetchError, FetchedPage, Fetcher, HttpFetcher, RenderOptions, USER_AGENTS,
};
pub use frontier::{CrawlTask, Frontier, OfferOutcome};
pub use orchestrator::{CrawlRequest, CrawlSession, Orchestrator};
pub use parser::{extract_clean_text, parse_page, ContentExtractor, ParsedPage, PlainTextExtractor};
pub use special::{OverrideRule, OverrideTable};
