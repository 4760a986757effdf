//! Xiaohongshu "radar": search directives for posts asking for paid help.
//!
//! The site cannot be scraped without a logged-in browser, so this sensor
//! makes no requests. It turns the configured queries into ready-to-open
//! search links for a human to follow up.

use super::Sensor;
use crate::config::Config;
use crate::error::Result;
use crate::models::{Category, Item};
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use urlencoding::encode;

pub const NAME: &str = "xhs";

pub struct XhsRadar {
    config: Arc<Config>,
}

impl XhsRadar {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn directive(&self, query: &str, today: &str) -> Item {
        let url = format!(
            "{}?keyword={}&source=web_search_result_notes",
            self.config.endpoints.xhs_search,
            encode(query)
        );
        let mut item = Item::new("小红书", format!("🔎 Search directive: {query}"))
            .with_category("XHS")
            .with_url(url)
            .with_time(today);
        item.summary = Some(format!(
            "Open to find posts about '{query}'. Watch for: {}.",
            self.config.sensors.xhs_keywords.join(", ")
        ));
        item
    }
}

#[async_trait]
impl Sensor for XhsRadar {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> Category {
        Category::XhsDirectives
    }

    fn effective_limit(&self, _requested: usize) -> usize {
        self.config.sensors.xhs_limit
    }

    async fn collect(&self, limit: usize) -> Result<Vec<Item>> {
        let today = Local::now().format("%Y-%m-%d").to_string();
        Ok(self
            .config
            .sensors
            .xhs_queries
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .take(limit.min(self.config.sensors.xhs_limit))
            .map(|q| self.directive(q, &today))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directives_are_capped_and_encoded() {
        let radar = XhsRadar::new(Arc::new(Config::default()));
        let items = radar.collect(100).await.unwrap();
        assert_eq!(items.len(), 8);

        let first = &items[0];
        assert_eq!(first.title, "🔎 Search directive: 毕设求助");
        assert!(first.url.starts_with("https://www.xiaohongshu.com/search_result?keyword=%E6%AF%95"));
        assert!(first.summary.as_deref().unwrap().contains("救命"));
        assert_eq!(first.time.len(), 10);
    }

    #[tokio::test]
    async fn test_spaces_are_percent_encoded() {
        let mut config = Config::default();
        config.sensors.xhs_queries = vec!["Excel 自动化".to_string(), "  ".to_string()];
        let radar = XhsRadar::new(Arc::new(config));
        let items = radar.collect(10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].url.contains("keyword=Excel%20"));
    }

    #[test]
    fn test_effective_limit() {
        let radar = XhsRadar::new(Arc::new(Config::default()));
        assert_eq!(radar.effective_limit(1), 8);
        assert_eq!(radar.effective_limit(30), 8);
    }
}
