//! V2EX hot topics (JSON API).

use super::{SourceFetcher, filter_and_limit};
use crate::config::Config;
use crate::error::Result;
use crate::http::get_json;
use crate::models::Item;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct Topic {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    replies: u64,
}

pub struct V2ex {
    client: Client,
    config: Arc<Config>,
}

impl V2ex {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SourceFetcher for V2ex {
    fn key(&self) -> &'static str {
        "v2ex"
    }

    fn name(&self) -> &'static str {
        "V2EX"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let url = &self.config.endpoints.v2ex;
        let topics: Vec<serde_json::Value> =
            get_json(&self.client, url, self.config.http.source_timeout()).await?;
        Ok(filter_and_limit(parse_topics(topics), keyword, limit))
    }
}

/// Map raw topic objects; malformed rows are skipped individually.
fn parse_topics(raw: Vec<serde_json::Value>) -> Vec<Item> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Topic>(value) {
            Ok(Topic {
                title: Some(title),
                url: Some(url),
                replies,
            }) => Some(
                Item::new("V2EX", title)
                    .with_url(url)
                    .with_heat(format!("{replies} replies"))
                    .with_time("Hot"),
            ),
            Ok(_) => {
                debug!("Skipping V2EX topic without title or url");
                None
            }
            Err(e) => {
                debug!(error = %e, "Skipping malformed V2EX topic");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_topics_skips_bad_rows() {
        let raw: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"title": "V2EX Topic", "url": "https://www.v2ex.com/t/1", "replies": 50},
                {"url": "https://www.v2ex.com/t/2"},
                {"title": "No replies field", "url": "https://www.v2ex.com/t/3"},
                {"title": 7, "url": "https://www.v2ex.com/t/4"}
            ]"#,
        )
        .unwrap();
        let items = parse_topics(raw);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].heat, "50 replies");
        assert_eq!(items[0].time, "Hot");
        assert_eq!(items[1].heat, "0 replies");
    }

    #[tokio::test]
    async fn test_non_array_body_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"error": "rate limited"}"#))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.endpoints.v2ex = server.uri();
        let config = Arc::new(config);
        let fetcher = V2ex::new(build_client(&config.http).unwrap(), config);
        assert!(fetcher.fetch(5, None).await.is_empty());
    }
}
