use super::types::CatalogIdentifier;
use regex::Regex;
use std::sync::LazyLock;

/// Storefront host that shared links must point at.
pub const STORE_HOST: &str = "store.steampowered.com";

/// Store app link: scheme, exact host, `/app/<digits>`, at most one more
/// path segment (with an optional trailing slash), never crossing whitespace.
static STORE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://store\.steampowered\.com/app/\d+(?:/[^/\s]+)?/?")
        .expect("store link pattern is a valid regex")
});

static APP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/app/(\d+)").expect("app id pattern is a valid regex"));

/// Extract store links from free-form text, in order of appearance.
///
/// Repeated links are kept as separate entries; counting repeats is the
/// ledger's job. No normalization happens here.
pub fn extract_links(text: &str) -> Vec<String> {
    STORE_LINK
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Digit run following `/app/`, if any.
pub fn identifier_of(url: &str) -> Option<CatalogIdentifier> {
    APP_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| CatalogIdentifier::new(m.as_str()))
}
