//! 36Kr newsflash scraper.

use super::{SourceFetcher, filter_and_limit};
use crate::config::Config;
use crate::error::Result;
use crate::http::get_text;
use crate::models::Item;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

const SITE_ROOT: &str = "https://36kr.com";

static FLASH: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".newsflash-item").expect("valid selector"));
static FLASH_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".item-title").expect("valid selector"));
static FLASH_TIME: Lazy<Selector> = Lazy::new(|| Selector::parse(".time").expect("valid selector"));

pub struct Kr36 {
    client: Client,
    config: Arc<Config>,
}

impl Kr36 {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SourceFetcher for Kr36 {
    fn key(&self) -> &'static str {
        "36kr"
    }

    fn name(&self) -> &'static str {
        "36Kr"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let url = &self.config.endpoints.kr36;
        let html = get_text(&self.client, url, self.config.http.source_timeout()).await?;
        Ok(filter_and_limit(parse_newsflashes(&html), keyword, limit))
    }
}

pub fn parse_newsflashes(html: &str) -> Vec<Item> {
    let document = Html::parse_document(html);
    let base = Url::parse(SITE_ROOT).ok();
    document
        .select(&FLASH)
        .filter_map(|flash| {
            let item = parse_flash(flash, base.as_ref());
            if item.is_none() {
                debug!("Skipping unparseable 36Kr newsflash");
            }
            item
        })
        .collect()
}

fn parse_flash(flash: ElementRef<'_>, base: Option<&Url>) -> Option<Item> {
    let title_el = flash.select(&FLASH_TITLE).next()?;
    let title = title_el.text().collect::<String>().trim().to_string();
    let href = title_el.value().attr("href")?;
    let url = if href.starts_with("http") {
        href.to_string()
    } else {
        base.and_then(|b| b.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("{SITE_ROOT}{href}"))
    };
    let time = flash
        .select(&FLASH_TIME)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    Some(Item::new("36Kr", title).with_url(url).with_time(time))
}
