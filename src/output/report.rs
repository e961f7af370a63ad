//! Report rendering: JSON serialization and the human-readable summary
//!
//! The JSON shape mirrors the crawl data model field for field; it is the
//! payload the HTTP API layer returns to clients.

use crate::output::CrawlResult;
use crate::Result;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

/// Serializes a crawl result as pretty-printed JSON
pub fn write_json(result: &CrawlResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes a crawl result as JSON to a file
pub fn write_json_to(result: &CrawlResult, path: &Path) -> Result<()> {
    let json = write_json(result)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    tracing::info!("Wrote crawl result to {}", path.display());
    Ok(())
}

/// Renders a short human-readable summary for terminal output
pub fn render_summary(result: &CrawlResult) -> String {
    let domains: BTreeSet<_> = result
        .pages
        .iter()
        .filter_map(|p| url::Url::parse(&p.final_url).ok())
        .filter_map(|u| u.host_str().map(|h| h.to_lowercase()))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("Seed:        {}\n", result.seed));
    out.push_str(&format!(
        "Pages:       {} fetched, {} errored, {} skipped\n",
        result.summary.fetched, result.summary.errored, result.summary.skipped
    ));
    out.push_str(&format!("Domains:     {}\n", domains.len()));
    out.push_str(&format!("Stop reason: {:?}\n", result.summary.stop_reason));
    out.push_str(&format!(
        "Elapsed:     {:.2}s\n",
        result.summary.elapsed_seconds
    ));
    out
}
