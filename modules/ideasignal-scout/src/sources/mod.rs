//! HTTP adapters for the external data providers.
//!
//! Each provider client returns `anyhow::Result`; [`LiveFetcher`] is the
//! boundary that turns those errors into failed results.

pub mod google;
pub mod kakao;
pub mod live;
pub mod naver;
pub mod reddit;
pub mod youtube;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use ideasignal_common::{classify_topic, FilterConfig, SignalItem};

pub use live::LiveFetcher;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Remove search-highlight tags (`<b>`) and decode the common HTML entities
/// providers embed in titles.
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    without_tags
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Web-search pre-filter: blocked domain substrings in the URL, or a
/// sensitive title.
pub(crate) fn web_item_allowed(item: &SignalItem, filters: &FilterConfig) -> bool {
    let blocked = filters
        .blocked_domains
        .iter()
        .filter(|d| !d.is_empty())
        .any(|d| item.url.contains(d.as_str()));
    !blocked && !classify_topic(&item.title, filters).is_sensitive()
}

/// Forum pre-filter: blocked community (case-insensitive exact match), or a
/// sensitive title.
pub(crate) fn forum_item_allowed(item: &SignalItem, filters: &FilterConfig) -> bool {
    let origin = item.origin.as_deref().unwrap_or("").to_lowercase();
    let blocked = filters
        .blocked_subreddits
        .iter()
        .any(|s| s.to_lowercase() == origin);
    !blocked && !classify_topic(&item.title, filters).is_sensitive()
}
