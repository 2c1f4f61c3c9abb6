use crate::url::{Classification, LinkKind, SeedContext};
use url::Url;

/// Derives the claim keys for a classified link
///
/// # Canonical Rule
///
/// 1. Fragments are already gone (the classifier strips them)
/// 2. Query strings are dropped unless the seed keeps them
/// 3. Internal and alias targets are keyed by path, so `www.` and bare-domain
///    variants of the same path are one page
/// 4. External targets are keyed by absolute URL
/// 5. Both trailing-slash forms are registered (root `/` has only one)
/// 6. The raw href is added when it means the same thing on every page
///    (absolute, scheme-relative or root-relative)
///
/// Skipped links (out of scope, malformed) have no keys.
///
/// # Examples
///
/// ```
/// use sitewalk::url::{canonical_keys, classify, SeedContext};
///
/// let seed = SeedContext::parse("https://example.com/").unwrap();
/// let link = classify("/about", seed.url(), &seed);
/// assert_eq!(canonical_keys("/about", &link, &seed), vec!["/about", "/about/"]);
/// ```
pub fn canonical_keys(raw_href: &str, link: &Classification, seed: &SeedContext) -> Vec<String> {
    let url = match (link.kind, link.url()) {
        (LinkKind::Internal | LinkKind::ExternalAlias | LinkKind::External, Some(url)) => url,
        _ => return Vec::new(),
    };

    let mut keys = match link.kind {
        LinkKind::External => absolute_variants(url),
        _ => path_variants(url.path())
            .into_iter()
            .map(|path| with_query(path, url, seed))
            .collect(),
    };

    let raw = raw_href.trim();
    if is_context_free(raw) {
        keys.push(raw.to_string());
    }

    dedup(keys)
}

/// Keys the seed claims before traversal starts
///
/// The raw seed string, its normalized form, its path keys, and `/` when the
/// seed is the home page. A kept query makes the seed a different page from
/// the bare `/`.
pub fn seed_keys(seed: &SeedContext) -> Vec<String> {
    let mut keys = vec![seed.raw().to_string(), seed.url().to_string()];
    let path_keys: Vec<String> = path_variants(seed.path())
        .into_iter()
        .map(|path| with_query(path, seed.url(), seed))
        .collect();
    let keyed_by_bare_path = path_keys.iter().all(|key| !key.contains('?'));
    keys.extend(path_keys);
    if seed.is_home() && keyed_by_bare_path {
        keys.push("/".to_string());
    }
    dedup(keys)
}

/// Both trailing-slash forms of a path
fn path_variants(path: &str) -> Vec<String> {
    if path.is_empty() || path == "/" {
        return vec!["/".to_string()];
    }

    match path.strip_suffix('/') {
        Some(trimmed) => vec![path.to_string(), trimmed.to_string()],
        None => vec![path.to_string(), format!("{}/", path)],
    }
}

fn with_query(path: String, url: &Url, seed: &SeedContext) -> String {
    match url.query() {
        Some(query) if !seed.strip_query() => format!("{}?{}", path, query),
        _ => path,
    }
}

fn absolute_variants(url: &Url) -> Vec<String> {
    path_variants(url.path())
        .into_iter()
        .map(|path| {
            let mut variant = url.clone();
            variant.set_path(&path);
            variant.to_string()
        })
        .collect()
}

fn is_context_free(raw: &str) -> bool {
    if raw.is_empty() {
        return false;
    }
    raw.starts_with('/') || Url::parse(raw).is_ok()
}

fn dedup(keys: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keys.len());
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
