use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

static LEADING_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]\s+").expect("valid ordinal pattern"));

/// Collapses every whitespace run into a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical dedup key for a content fragment.
///
/// Every call site that compares fragments goes through this function:
/// whitespace is collapsed and the ends trimmed. Case is preserved.
pub fn dedup_key(text: &str) -> String {
    collapse_whitespace(text)
}

/// The key without its leading list ordinal ("1. ", "2) "), if it has one
pub fn strip_ordinal(key: &str) -> Option<&str> {
    LEADING_ORDINAL
        .find(key)
        .map(|m| &key[m.end()..])
        .filter(|rest| !rest.is_empty())
}

/// Resolves a possibly-relative reference against the page URL.
///
/// Returns `None` for empty references, `data:`/`javascript:` URIs and
/// anything that does not resolve to http(s).
pub fn resolve_url(base: &str, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty()
        || reference.starts_with("data:")
        || reference.starts_with("javascript:")
        || reference.starts_with('#')
    {
        return None;
    }

    let resolved = match Url::parse(base) {
        Ok(base) => base.join(reference).ok()?,
        Err(_) => Url::parse(reference).ok()?,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Host of a URL without a leading `www.`
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.trim_start_matches("www.").to_lowercase())
}

/// Sleeps for the given number of milliseconds (no-op for zero)
pub async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
