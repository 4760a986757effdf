//! Source fetchers for the external hot lists.
//!
//! Each submodule wraps one site or API and exposes a type implementing
//! [`SourceFetcher`]. Parsing lives in a pure `parse_*` function over the
//! response body so it can be exercised without the network.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Collector category |
//! |--------|--------|--------|--------------------|
//! | Hacker News | [`hackernews`] | HTML, paginated | `tech_trends` |
//! | GitHub Trending | [`github`] | HTML | `tech_trends` |
//! | 36Kr newsflashes | [`kr36`] | HTML | `capital_flow` |
//! | WallStreetCN | [`wallstreetcn`] | JSON | `capital_flow` |
//! | V2EX hot topics | [`v2ex`] | JSON | `community` |
//! | Weibo hot search | [`weibo`] | JSON | `fetch` command only |
//! | Tencent News | [`tencent`] | JSON | `fetch` command only |
//! | Product Hunt | [`producthunt`] | Atom/RSS feed | via the Product Hunt sensor |
//!
//! # Contract
//!
//! [`SourceFetcher::fetch`] never fails: any transport, status or parse
//! error is logged at warning level and becomes an empty list. The keyword
//! filter is applied before the list is truncated to `limit`.

pub mod content;
pub mod github;
pub mod hackernews;
pub mod kr36;
pub mod producthunt;
pub mod tencent;
pub mod v2ex;
pub mod wallstreetcn;
pub mod weibo;

use crate::config::Config;
use crate::error::Result;
use crate::models::Item;
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Short identifier used on the command line, e.g. `hackernews`.
    fn key(&self) -> &'static str;

    /// Display label, e.g. `Hacker News`.
    fn name(&self) -> &'static str;

    /// Fetch, filter and truncate. Errors propagate to [`SourceFetcher::fetch`].
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>>;

    async fn fetch(&self, limit: usize, keyword: Option<&str>) -> Vec<Item> {
        match self.try_fetch(limit, keyword).await {
            Ok(items) => {
                info!(source = self.name(), count = items.len(), "Fetched items");
                items
            }
            Err(e) => {
                warn!(source = self.name(), error = %e, "Fetch failed; returning no items");
                Vec::new()
            }
        }
    }
}

/// Every source the `fetch` command knows about, in display order.
pub fn all_fetchers(client: &Client, config: &Arc<Config>) -> Vec<Arc<dyn SourceFetcher>> {
    vec![
        Arc::new(hackernews::HackerNews::new(client.clone(), Arc::clone(config))),
        Arc::new(weibo::Weibo::new(client.clone(), Arc::clone(config))),
        Arc::new(github::GithubTrending::new(client.clone(), Arc::clone(config))),
        Arc::new(kr36::Kr36::new(client.clone(), Arc::clone(config))),
        Arc::new(v2ex::V2ex::new(client.clone(), Arc::clone(config))),
        Arc::new(tencent::Tencent::new(client.clone(), Arc::clone(config))),
        Arc::new(wallstreetcn::WallStreetCn::new(client.clone(), Arc::clone(config))),
        Arc::new(producthunt::ProductHuntFeed::new(client.clone(), Arc::clone(config))),
    ]
}

/// Resolve a comma-separated `--source` value (`all` selects everything).
///
/// Unknown names are logged and ignored.
pub fn select_fetchers(
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    spec: &str,
) -> Vec<Arc<dyn SourceFetcher>> {
    if spec.trim().eq_ignore_ascii_case("all") {
        return fetchers;
    }
    let mut selected = Vec::new();
    for wanted in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match fetchers.iter().find(|f| f.key().eq_ignore_ascii_case(wanted)) {
            Some(f) => selected.push(Arc::clone(f)),
            None => warn!(source = wanted, "Unknown source; skipping"),
        }
    }
    selected
}

/// Build the whole-word, case-insensitive matcher for a comma-separated keyword list.
///
/// Returns `None` when there is nothing to filter on.
pub fn keyword_matcher(keyword: Option<&str>) -> Option<Regex> {
    let terms: Vec<String> = keyword?
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!(r"\b{}\b", regex::escape(t)))
        .collect();
    if terms.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!("({})", terms.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Keep the items whose title matches any keyword term as a whole word.
pub fn filter_items(items: Vec<Item>, keyword: Option<&str>) -> Vec<Item> {
    match keyword_matcher(keyword) {
        None => items,
        Some(re) => items.into_iter().filter(|i| re.is_match(&i.title)).collect(),
    }
}

/// Apply the keyword filter, then cap the list at `limit`.
pub fn filter_and_limit(items: Vec<Item>, keyword: Option<&str>, limit: usize) -> Vec<Item> {
    let mut items = filter_items(items, keyword);
    items.truncate(limit);
    items
}
