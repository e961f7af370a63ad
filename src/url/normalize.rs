use crate::UrlError;
use url::Url;

/// Parses a string as an absolute HTTP(S) URL
///
/// # Arguments
///
/// * `raw` - The URL string to parse
///
/// # Returns
///
/// * `Ok(Url)` - Parsed absolute URL
/// * `Err(UrlError)` - Not parseable, wrong scheme, or no host
///
/// Relative references fail here; callers must resolve them against the
/// page's final URL first.
///
/// # Examples
///
/// ```
/// use harvestman::url::parse_absolute;
///
/// let url = parse_absolute("https://example.com/page").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
/// assert!(parse_absolute("/relative/path").is_err());
/// ```
pub fn parse_absolute(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Prepends `https://` to a URL string that carries no scheme
///
/// Seed URLs arrive from callers as bare hostnames more often than not;
/// they are coerced to HTTPS before parsing.
pub fn ensure_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Produces the canonical identity key for a URL
///
/// Two URLs with the same canonical key are treated as the same page for
/// deduplication. The key is built from:
///
/// 1. Lowercased scheme and host
/// 2. The path with any trailing `/` removed (except the root path)
/// 3. No fragment
/// 4. The query string, unless `ignore_query` is set
///
/// Non-default ports are preserved. The transform is idempotent: parsing a
/// canonical key and normalizing it again yields the same key.
///
/// # Examples
///
/// ```
/// use harvestman::url::{canonical_key, parse_absolute};
///
/// let url = parse_absolute("https://Example.COM/page/?x=1#top").unwrap();
/// assert_eq!(canonical_key(&url, false), "https://example.com/page?x=1");
/// assert_eq!(canonical_key(&url, true), "https://example.com/page");
/// ```
pub fn canonical_key(url: &Url, ignore_query: bool) -> String {
    let scheme = url.scheme().to_ascii_lowercase();
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

    let port = match url.port() {
        Some(p) => format!(":{}", p),
        None => String::new(),
    };

    let trimmed = url.path().trim_end_matches('/');
    let path = if trimmed.is_empty() { "/" } else { trimmed };

    let query = match url.query() {
        Some(q) if !ignore_query && !q.is_empty() => format!("?{}", q),
        _ => String::new(),
    };

    format!("{}://{}{}{}{}", scheme, host, port, path, query)
}
