use url::Url;

/// Extracts the lowercased host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use harvestman::url::host_of;
///
/// let url = Url::parse("https://Blog.Example.COM/post").unwrap();
/// assert_eq!(host_of(&url), Some("blog.example.com".to_string()));
/// ```
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a host matches an allowed domain entry
///
/// A candidate matches if it equals the entry exactly or is a subdomain of
/// it: `blog.example.com` matches the entry `example.com`, but
/// `notexample.com` does not. Both sides are expected lowercase.
pub fn matches_domain(entry: &str, candidate: &str) -> bool {
    candidate == entry || candidate.ends_with(&format!(".{}", entry))
}

/// Traversal policy for hosts discovered during a crawl
///
/// Built once per session from the policy snapshot. An empty allowed list
/// means no restriction; `follow_external` overrides the list entirely for
/// traversal decisions.
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    allowed: Vec<String>,
    follow_external: bool,
}

impl DomainPolicy {
    /// Creates a domain policy from a restriction list and external-link flag
    pub fn new<I, S>(allowed: I, follow_external: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .collect(),
            follow_external,
        }
    }

    /// Whether the host matches the restriction list
    ///
    /// Always true when the list is empty.
    pub fn is_domain_allowed(&self, host: &str) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        let host = host.to_lowercase();
        self.allowed.iter().any(|d| matches_domain(d, &host))
    }

    /// Whether the host may be traversed
    ///
    /// `follow_external` admits hosts outside the restriction list.
    pub fn permits(&self, host: &str) -> bool {
        self.follow_external || self.is_domain_allowed(host)
    }
}
