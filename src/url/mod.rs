//! URL handling: canonicalization, domain policy, and exclusion patterns
//!
//! Everything that decides URL identity or URL eligibility lives here:
//! - `normalize` produces the canonical key used for deduplication
//! - `domain` answers whether a host may be traversed
//! - `filter` applies the configured regex exclusion patterns

mod domain;
mod filter;
mod normalize;

pub use domain::{host_of, matches_domain, DomainPolicy};
pub use filter::PatternFilter;
pub use normalize::{canonical_key, ensure_scheme, parse_absolute};
