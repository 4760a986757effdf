//! Product Hunt public feed.

use super::{SourceFetcher, filter_and_limit};
use crate::config::Config;
use crate::error::Result;
use crate::feed::{Feed, parse_feed};
use crate::http::get_text;
use crate::models::Item;
use crate::utils::fragment_to_text;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::instrument;

pub struct ProductHuntFeed {
    client: Client,
    config: Arc<Config>,
}

impl ProductHuntFeed {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SourceFetcher for ProductHuntFeed {
    fn key(&self) -> &'static str {
        "producthunt"
    }

    fn name(&self) -> &'static str {
        "Product Hunt"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let url = &self.config.endpoints.producthunt_feed;
        let xml = get_text(&self.client, url, self.config.http.source_timeout()).await?;
        Ok(filter_and_limit(map_feed(parse_feed(&xml)?), keyword, limit))
    }
}

/// Entries become items; the entry body's first text is kept as the tagline.
fn map_feed(feed: Feed) -> Vec<Item> {
    feed.entries
        .into_iter()
        .filter(|e| !e.title.is_empty())
        .map(|entry| {
            let tagline = fragment_to_text(&entry.body);
            let mut item = Item::new("Product Hunt", entry.title)
                .with_url(entry.link)
                .with_time(entry.published_raw)
                .with_heat("Top Product");
            if !tagline.is_empty() {
                item.tagline = Some(tagline);
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PH_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xml:lang="en-US" xmlns="http://www.w3.org/2005/Atom">
  <title>Product Hunt</title>
  <entry>
    <id>tag:www.producthunt.com,2005:Post/1</id>
    <published>2026-10-17T00:01:00-07:00</published>
    <link rel="alternate" type="text/html" href="https://www.producthunt.com/products/agentdesk"/>
    <title>AgentDesk</title>
    <content type="html">&lt;p&gt; Your AI teammates in one inbox &lt;/p&gt;</content>
    <author><name>Maker</name></author>
  </entry>
  <entry>
    <id>tag:www.producthunt.com,2005:Post/2</id>
    <link rel="alternate" type="text/html" href="https://www.producthunt.com/products/shipit"/>
    <title>ShipIt</title>
  </entry>
</feed>"#;

    #[tokio::test]
    async fn test_fetch_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PH_FEED))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.endpoints.producthunt_feed = server.uri();
        let config = Arc::new(config);
        let fetcher = ProductHuntFeed::new(build_client(&config.http).unwrap(), config);

        let items = fetcher.fetch(10, None).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "AgentDesk");
        assert_eq!(items[0].url, "https://www.producthunt.com/products/agentdesk");
        assert_eq!(items[0].tagline.as_deref(), Some("Your AI teammates in one inbox"));
        assert_eq!(items[0].heat, "Top Product");
        assert!(items[1].tagline.is_none());
    }

    #[tokio::test]
    async fn test_garbage_feed_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.endpoints.producthunt_feed = server.uri();
        let config = Arc::new(config);
        let fetcher = ProductHuntFeed::new(build_client(&config.http).unwrap(), config);
        assert!(fetcher.fetch(10, None).await.is_empty());
    }
}
