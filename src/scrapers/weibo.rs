//! Weibo hot search (JSON API). Available to the `fetch` command.

use super::{SourceFetcher, filter_and_limit};
use crate::config::Config;
use crate::error::Result;
use crate::http::get_json_with;
use crate::models::Item;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::REFERER;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HotSearch {
    data: HotData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HotData {
    realtime: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    note: Option<String>,
    word: Option<String>,
    num: Option<serde_json::Value>,
}

pub struct Weibo {
    client: Client,
    config: Arc<Config>,
}

impl Weibo {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SourceFetcher for Weibo {
    fn key(&self) -> &'static str {
        "weibo"
    }

    fn name(&self) -> &'static str {
        "Weibo Hot Search"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let url = &self.config.endpoints.weibo;
        let request = self
            .client
            .get(url)
            .header(REFERER, "https://weibo.com/")
            .timeout(self.config.http.source_timeout());
        let body: HotSearch = get_json_with(request, url).await?;
        Ok(filter_and_limit(map_hot_search(body), keyword, limit))
    }
}

fn map_hot_search(body: HotSearch) -> Vec<Item> {
    body.data
        .realtime
        .into_iter()
        .filter_map(|entry| {
            let title = entry
                .note
                .filter(|n| !n.is_empty())
                .or(entry.word)
                .filter(|t| !t.is_empty())?;
            let heat = match entry.num {
                Some(serde_json::Value::Number(n)) => n.to_string(),
                Some(serde_json::Value::String(s)) => s,
                _ => "0".to_string(),
            };
            let url = format!(
                "https://s.weibo.com/weibo?q={}&Refer=top",
                urlencoding::encode(&title)
            );
            Some(
                Item::new("Weibo Hot Search", title)
                    .with_url(url)
                    .with_heat(heat)
                    .with_time("Real-time"),
            )
        })
        .collect()
}
