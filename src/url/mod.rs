//! URL handling module for Sitewalk
//!
//! This module provides the seed context, link classification, host alias
//! handling, and the canonical key derivation used for deduplication.
//!
//! Classification is a pure function of the href, the page it was found on,
//! and the seed. It never touches the visited set.

mod domain;
mod normalize;
mod seed;

use serde::{Deserialize, Serialize};
use url::Url;

pub use domain::{extract_domain, host_alias};
pub use normalize::{canonical_keys, seed_keys};
pub use seed::SeedContext;

/// Disposition of one discovered link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Same host as the seed - fetched and expanded
    Internal,
    /// `www.`/bare-domain toggle of the seed host - fetched, expanded, flagged
    ExternalAlias,
    /// Any other host - fetched once for its status, never expanded
    External,
    /// Scheme other than http/https (mailto:, tel:, javascript:, ...)
    OutOfScope,
    /// The href could not be parsed or resolved
    Malformed,
}

impl LinkKind {
    /// Returns true if the link must never be fetched
    pub fn skip(&self) -> bool {
        matches!(self, Self::OutOfScope | Self::Malformed)
    }

    /// Returns true if anchors of the fetched page are followed
    pub fn expands(&self) -> bool {
        matches!(self, Self::Internal | Self::ExternalAlias)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::ExternalAlias => "external_alias",
            Self::External => "external",
            Self::OutOfScope => "out_of_scope",
            Self::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one href
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Resolved absolute target, or the trimmed href when it cannot be resolved
    pub target: String,
    pub kind: LinkKind,
    /// The caller must not fetch this target
    pub skip: bool,
    /// The href carried no host of its own and was resolved onto the seed site
    pub relative: bool,
    /// Parse or resolution failure message for malformed links
    pub reason: Option<String>,
    url: Option<Url>,
}

impl Classification {
    fn resolved(url: Url, kind: LinkKind, relative: bool) -> Self {
        Self {
            target: url.to_string(),
            kind,
            skip: kind.skip(),
            relative,
            reason: None,
            url: Some(url),
        }
    }

    fn malformed(href: &str, reason: impl Into<String>) -> Self {
        Self {
            target: href.to_string(),
            kind: LinkKind::Malformed,
            skip: true,
            relative: false,
            reason: Some(reason.into()),
            url: None,
        }
    }

    /// The parsed target, absent only for malformed links
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

/// Classifies a raw href found on `found_on`
///
/// # Rules
///
/// 1. Parse the href; failure yields `Malformed`
/// 2. Strip the fragment (and the query string when the seed strips queries)
/// 3. A scheme other than http/https yields `OutOfScope`
/// 4. A href without a host resolves against `found_on`, then onto the seed's
///    scheme/host/port, and is `Internal`
/// 5. The seed host (case-insensitive, same port) is `Internal`
/// 6. The seed host's `www.` toggle is `ExternalAlias`
/// 7. Anything else is `External`
///
/// # Examples
///
/// ```
/// use sitewalk::url::{classify, LinkKind, SeedContext};
///
/// let seed = SeedContext::parse("https://example.com/").unwrap();
/// let found_on = seed.url().clone();
///
/// assert_eq!(classify("/about", &found_on, &seed).kind, LinkKind::Internal);
/// assert_eq!(
///     classify("https://www.example.com/x", &found_on, &seed).kind,
///     LinkKind::ExternalAlias
/// );
/// assert!(classify("tel:+1234", &found_on, &seed).skip);
/// ```
pub fn classify(raw_href: &str, found_on: &Url, seed: &SeedContext) -> Classification {
    let href = raw_href.trim();

    let (mut url, relative) = match Url::parse(href) {
        Ok(url) => (url, false),
        Err(url::ParseError::RelativeUrlWithoutBase) => match found_on.join(href) {
            Ok(mut url) => {
                // Scheme-relative hrefs (`//host/path`) name their own host
                if href.starts_with("//") {
                    (url, false)
                } else {
                    if let Err(reason) = seed.rebase(&mut url) {
                        return Classification::malformed(href, reason);
                    }
                    (url, true)
                }
            }
            Err(e) => return Classification::malformed(href, e.to_string()),
        },
        Err(e) => return Classification::malformed(href, e.to_string()),
    };

    url.set_fragment(None);

    if url.scheme() != "http" && url.scheme() != "https" {
        return Classification::resolved(url, LinkKind::OutOfScope, relative);
    }

    if seed.strip_query() {
        url.set_query(None);
    }

    let kind = if relative {
        LinkKind::Internal
    } else {
        seed.scope_of(&url)
    };

    // Absolute links to the seed host are fetched the way the seed is
    if kind == LinkKind::Internal && !relative {
        if let Err(reason) = seed.rebase(&mut url) {
            return Classification::malformed(href, reason);
        }
    }

    Classification::resolved(url, kind, relative)
}
