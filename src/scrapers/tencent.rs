//! Tencent News tag feed (JSON API). Available to the `fetch` command.

use super::{SourceFetcher, filter_and_limit};
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::http::get_json_with;
use crate::models::Item;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::REFERER;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct TagInfo {
    data: TagData,
}

#[derive(Debug, Deserialize)]
struct TagData {
    tabs: Vec<Tab>,
}

#[derive(Debug, Deserialize)]
struct Tab {
    #[serde(rename = "articleList", default)]
    article_list: Vec<Article>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Article {
    title: Option<String>,
    url: Option<String>,
    link_info: Option<LinkInfo>,
    pub_time: Option<String>,
    publish_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LinkInfo {
    url: Option<String>,
}

pub struct Tencent {
    client: Client,
    config: Arc<Config>,
}

impl Tencent {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SourceFetcher for Tencent {
    fn key(&self) -> &'static str {
        "tencent"
    }

    fn name(&self) -> &'static str {
        "Tencent News"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let url = &self.config.endpoints.tencent;
        let request = self
            .client
            .get(url)
            .header(REFERER, "https://news.qq.com/")
            .timeout(self.config.http.source_timeout());
        let body: TagInfo = get_json_with(request, url).await?;
        Ok(filter_and_limit(map_articles(body)?, keyword, limit))
    }
}

fn map_articles(body: TagInfo) -> Result<Vec<Item>> {
    let tab = body
        .data
        .tabs
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("tencent response has no tabs".to_string()))?;

    Ok(tab
        .article_list
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.is_empty())?;
            let url = a
                .url
                .filter(|u| !u.is_empty())
                .or_else(|| a.link_info.and_then(|l| l.url))
                .unwrap_or_default();
            let time = a
                .pub_time
                .filter(|t| !t.is_empty())
                .or(a.publish_time)
                .unwrap_or_default();
            Some(Item::new("Tencent News", title).with_url(url).with_time(time))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_articles_falls_back_to_link_info() {
        let body: TagInfo = serde_json::from_str(
            r#"{"data": {"tabs": [{"articleList": [
                {"title": "头条", "url": "https://news.qq.com/rain/a/1", "pub_time": "2026-01-01 08:00"},
                {"title": "二条", "link_info": {"url": "https://news.qq.com/rain/a/2"}, "publish_time": "09:00"},
                {"url": "https://news.qq.com/rain/a/3"}
            ]}]}}"#,
        )
        .unwrap();
        let items = map_articles(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].time, "2026-01-01 08:00");
        assert_eq!(items[1].url, "https://news.qq.com/rain/a/2");
        assert_eq!(items[1].time, "09:00");
    }

    #[test]
    fn test_map_articles_without_tabs_is_an_error() {
        let body: TagInfo = serde_json::from_str(r#"{"data": {"tabs": []}}"#).unwrap();
        assert!(matches!(map_articles(body), Err(FetchError::Parse(_))));
    }
}
