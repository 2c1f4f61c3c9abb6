use crate::url::domain::{extract_domain, host_alias};
use crate::url::LinkKind;
use crate::UrlError;
use url::Url;

/// Immutable per-run description of the seed URL
///
/// Built once before any concurrent work starts and only read afterwards, so
/// it is shared across tasks behind an `Arc` without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedContext {
    raw: String,
    url: Url,
    scheme: String,
    host: String,
    alias: String,
    port: Option<u16>,
    strip_query: bool,
}

impl SeedContext {
    /// Parses and validates a seed URL
    ///
    /// The seed must be absolute, use `http` or `https`, and carry a host.
    /// Its fragment is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewalk::url::SeedContext;
    ///
    /// let seed = SeedContext::parse("https://Example.com/docs#intro").unwrap();
    /// assert_eq!(seed.host(), "example.com");
    /// assert_eq!(seed.path(), "/docs");
    ///
    /// assert!(SeedContext::parse("example.com").is_err());
    /// assert!(SeedContext::parse("ftp://example.com/").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let raw = raw.trim();
        let mut url = Url::parse(raw).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => UrlError::NotAbsolute(raw.to_string()),
            other => UrlError::Parse(format!("{}: {}", raw, other)),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS seeds are supported, got: {}",
                url.scheme()
            )));
        }

        let host = extract_domain(&url)
            .filter(|h| !h.is_empty())
            .ok_or(UrlError::MissingHost)?;

        url.set_fragment(None);

        Ok(Self {
            raw: raw.to_string(),
            scheme: url.scheme().to_string(),
            alias: host_alias(&host),
            port: url.port(),
            host,
            url,
            strip_query: true,
        })
    }

    /// Sets whether query strings are dropped when deriving page identity
    pub fn with_query_stripping(mut self, strip_query: bool) -> Self {
        self.strip_query = strip_query;
        self
    }

    /// The seed string exactly as supplied (trimmed)
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Lowercase seed host, without port
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The `www.`/bare-domain toggle of the seed host
    pub fn alias_host(&self) -> &str {
        &self.alias
    }

    /// Explicit (non-default) seed port
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn strip_query(&self) -> bool {
        self.strip_query
    }

    /// Returns true when the seed points at the site's home page
    pub fn is_home(&self) -> bool {
        matches!(self.url.path(), "" | "/")
    }

    /// Rewrites scheme, host and port of `url` to the seed's
    ///
    /// Used for relative hrefs, which always belong to the seed site.
    pub(crate) fn rebase(&self, url: &mut Url) -> Result<(), String> {
        url.set_scheme(&self.scheme)
            .map_err(|_| format!("cannot set scheme {}", self.scheme))?;
        url.set_host(Some(&self.host)).map_err(|e| e.to_string())?;
        url.set_port(self.port)
            .map_err(|_| "cannot set port".to_string())?;
        Ok(())
    }

    /// Decides which side of the site boundary an absolute http(s) URL is on
    ///
    /// Host comparison is case-insensitive and the explicit port must match
    /// the seed's, so `example.com:8080` is external to `example.com`. The
    /// scheme is ignored: `http://example.com` belongs to an https seed.
    pub fn scope_of(&self, url: &Url) -> LinkKind {
        let host = match extract_domain(url) {
            Some(h) if !h.is_empty() => h,
            _ => return LinkKind::Internal,
        };

        if url.port() != self.port {
            return LinkKind::External;
        }

        if host == self.host {
            LinkKind::Internal
        } else if host == self.alias {
            LinkKind::ExternalAlias
        } else {
            LinkKind::External
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_seed() {
        let seed = SeedContext::parse("https://example.com/").unwrap();
        assert_eq!(seed.scheme(), "https");
        assert_eq!(seed.host(), "example.com");
        assert_eq!(seed.alias_host(), "www.example.com");
        assert_eq!(seed.port(), None);
        assert_eq!(seed.path(), "/");
        assert!(seed.is_home());
        assert!(seed.strip_query());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let seed = SeedContext::parse("  http://example.com/a  ").unwrap();
        assert_eq!(seed.raw(), "http://example.com/a");
        assert!(!seed.is_home());
    }

    #[test]
    fn test_parse_relative_is_not_absolute() {
        let err = SeedContext::parse("/just/a/path").unwrap_err();
        assert!(matches!(err, UrlError::NotAbsolute(_)));

        let err = SeedContext::parse("example.com").unwrap_err();
        assert!(matches!(err, UrlError::NotAbsolute(_)));
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        let err = SeedContext::parse("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = SeedContext::parse("http://exa mple.com").unwrap_err();
        assert!(matches!(err, UrlError::Parse(_)));
    }

    #[test]
    fn test_scope_of() {
        let seed = SeedContext::parse("https://example.com/").unwrap();
        let check = |s: &str| seed.scope_of(&Url::parse(s).unwrap());

        assert_eq!(check("https://example.com/a"), LinkKind::Internal);
        assert_eq!(check("https://EXAMPLE.com/a"), LinkKind::Internal);
        assert_eq!(check("https://www.example.com/a"), LinkKind::ExternalAlias);
        assert_eq!(check("https://other.com/"), LinkKind::External);
        assert_eq!(check("http://example.com/a"), LinkKind::Internal);
        assert_eq!(check("https://example.com:8443/"), LinkKind::External);
    }

    #[test]
    fn test_explicit_port_kept() {
        let seed = SeedContext::parse("http://127.0.0.1:4000/").unwrap();
        assert_eq!(seed.port(), Some(4000));
    }

    #[test]
    fn test_rebase() {
        let seed = SeedContext::parse("http://127.0.0.1:4000/").unwrap();
        let mut url = Url::parse("https://www.example.com/x?y=1").unwrap();
        seed.rebase(&mut url).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4000/x?y=1");
    }
}
