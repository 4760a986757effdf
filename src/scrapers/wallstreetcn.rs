//! WallStreetCN global information flow (JSON API).

use super::{SourceFetcher, filter_and_limit};
use crate::config::Config;
use crate::error::Result;
use crate::http::get_json;
use crate::models::Item;
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct Envelope {
    data: FlowData,
}

#[derive(Debug, Deserialize)]
struct FlowData {
    #[serde(default)]
    items: Vec<FlowItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlowItem {
    resource: Option<Resource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Resource {
    title: Option<String>,
    content_short: Option<String>,
    display_time: Option<i64>,
    uri: Option<String>,
}

pub struct WallStreetCn {
    client: Client,
    config: Arc<Config>,
}

impl WallStreetCn {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SourceFetcher for WallStreetCn {
    fn key(&self) -> &'static str {
        "wallstreetcn"
    }

    fn name(&self) -> &'static str {
        "Wall Street CN"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let url = &self.config.endpoints.wallstreetcn;
        let body: Envelope = get_json(&self.client, url, self.config.http.source_timeout()).await?;
        Ok(filter_and_limit(map_flow(body), keyword, limit))
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

fn map_flow(body: Envelope) -> Vec<Item> {
    body.data
        .items
        .into_iter()
        .filter_map(|item| item.resource)
        .filter_map(|res| {
            let title = non_empty(res.title).or_else(|| non_empty(res.content_short))?;
            Some(
                Item::new("Wall Street CN", title)
                    .with_url(res.uri.unwrap_or_default())
                    .with_time(display_time(res.display_time)),
            )
        })
        .collect()
}

/// Local `HH:MM` of a unix timestamp; empty when absent or zero.
fn display_time(ts: Option<i64>) -> String {
    match ts {
        Some(ts) if ts != 0 => Local
            .timestamp_opt(ts, 0)
            .single()
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
