//! arXiv AI papers via the export API.
//!
//! The API is flaky: it intermittently answers with an empty feed or a tiny
//! error page. Queries are therefore tried from narrow to broad, with a
//! pause between attempts, and the first strategy that yields papers wins.

use super::Sensor;
use crate::config::Config;
use crate::error::Result;
use crate::feed::{FeedEntry, parse_feed};
use crate::http::get_text_with;
use crate::models::{Category, Item};
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub const NAME: &str = "arxiv";

/// `(search_query, sortBy)` pairs, narrowest first.
const STRATEGIES: [(&str, &str); 3] = [
    ("cat:cs.AI", "submittedDate"),
    ("cat:cs.AI OR cat:cs.LG OR cat:cs.CL", "submittedDate"),
    ("cat:cs.AI OR cat:cs.LG", "lastUpdatedDate"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    /// `YYYY-MM-DD`.
    pub published: String,
    pub categories: Vec<String>,
}

impl Paper {
    fn from_entry(entry: FeedEntry) -> Option<Self> {
        let id = entry
            .id
            .trim()
            .trim_start_matches("https://arxiv.org/abs/")
            .trim_start_matches("http://arxiv.org/abs/")
            .to_string();
        let title = collapse_whitespace(&entry.title);
        if id.is_empty() || title.is_empty() {
            return None;
        }
        Some(Self {
            id,
            title,
            summary: collapse_whitespace(&entry.summary),
            authors: entry.authors.into_iter().take(3).collect(),
            published: entry
                .published_raw
                .get(..10)
                .unwrap_or(entry.published_raw.as_str())
                .to_string(),
            categories: entry.categories.into_iter().take(3).collect(),
        })
    }

    pub fn url(&self) -> String {
        format!("https://arxiv.org/abs/{}", self.id)
    }

    fn into_item(self) -> Item {
        let mut item = Item::new("ArXiv", &self.title)
            .with_category("ArXiv")
            .with_url(self.url())
            .with_time(&self.published);
        item.authors = Some(self.authors.iter().take(2).join(", "));
        item.categories = Some(self.categories.iter().take(2).join(", "));
        item.summary = Some(self.summary);
        item
    }
}

pub struct Arxiv {
    client: Client,
    config: Arc<Config>,
}

impl Arxiv {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    #[instrument(level = "info", skip(self))]
    async fn query(&self, search: &str, sort_by: &str, limit: usize) -> Result<Vec<Paper>> {
        let url = &self.config.endpoints.arxiv;
        let max_results = limit.to_string();
        let request = self
            .client
            .get(url)
            .query(&[
                ("search_query", search),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", sort_by),
                ("sortOrder", "descending"),
            ])
            .timeout(Duration::from_secs(self.config.sensors.arxiv_timeout_secs));
        let body = get_text_with(request, url).await?;

        if body.len() < self.config.sensors.arxiv_min_response_bytes {
            debug!(bytes = body.len(), "arXiv response too short; treating as empty");
            return Ok(Vec::new());
        }

        let feed = parse_feed(&body)?;
        Ok(feed
            .entries
            .into_iter()
            .filter_map(Paper::from_entry)
            .take(limit)
            .collect())
    }

    /// Run the strategies in order until one yields papers.
    pub async fn fetch_papers(&self, limit: usize) -> Vec<Paper> {
        let delay = Duration::from_millis(self.config.sensors.arxiv_retry_delay_ms);
        for (attempt, (search, sort_by)) in STRATEGIES.iter().enumerate() {
            if attempt > 0 {
                sleep(delay).await;
            }
            match self.query(search, sort_by, limit).await {
                Ok(papers) if !papers.is_empty() => {
                    info!(strategy = attempt + 1, count = papers.len(), "Fetched arXiv papers");
                    return papers;
                }
                Ok(_) => warn!(strategy = attempt + 1, "arXiv strategy returned no papers"),
                Err(e) => warn!(strategy = attempt + 1, error = %e, "arXiv strategy failed"),
            }
        }
        warn!("All arXiv strategies came back empty");
        Vec::new()
    }
}

#[async_trait]
impl Sensor for Arxiv {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> Category {
        Category::Research
    }

    async fn collect(&self, limit: usize) -> Result<Vec<Item>> {
        Ok(self
            .fetch_papers(limit)
            .await
            .into_iter()
            .map(Paper::into_item)
            .collect())
    }
}
