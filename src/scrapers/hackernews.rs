//! Hacker News front page scraper.
//!
//! Walks `news?p=N` pages until enough (keyword-filtered) stories are
//! collected, a page comes back empty or non-200, or the page ceiling is hit.
//! Pages are spaced by a short delay.

use super::{SourceFetcher, filter_items};
use crate::config::Config;
use crate::error::Result;
use crate::models::Item;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse(".athing").expect("valid selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".titleline > a").expect("valid selector"));

pub struct HackerNews {
    client: Client,
    config: Arc<Config>,
}

impl HackerNews {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    async fn fetch_page(&self, page: usize) -> Result<Option<String>> {
        let url = format!("{}/news?p={}", self.config.endpoints.hackernews, page);
        let response = self
            .client
            .get(&url)
            .timeout(self.config.http.source_timeout())
            .send()
            .await?;
        if response.status().as_u16() != 200 {
            debug!(page, status = response.status().as_u16(), "HN page not OK; stopping");
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }
}

#[async_trait]
impl SourceFetcher for HackerNews {
    fn key(&self) -> &'static str {
        "hackernews"
    }

    fn name(&self) -> &'static str {
        "Hacker News"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let base = self.config.endpoints.hackernews.trim_end_matches('/');
        let max_pages = self.config.collector.hn_max_pages;
        let delay = Duration::from_millis(self.config.collector.hn_page_delay_ms);
        let mut items = Vec::new();
        let mut page = 1;

        while items.len() < limit && page <= max_pages {
            let html = match self.fetch_page(page).await {
                Ok(Some(html)) => html,
                Ok(None) => break,
                // Nothing collected yet: the whole source failed.
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    warn!(page, error = %e, "HN page fetch failed; keeping earlier pages");
                    break;
                }
            };

            let page_items = parse_page(&html, base);
            if page_items.is_empty() {
                break;
            }
            items.extend(filter_items(page_items, keyword));
            if items.len() >= limit {
                break;
            }
            page += 1;
            tokio::time::sleep(delay).await;
        }

        items.truncate(limit);
        info!(count = items.len(), pages = page, "Collected HN stories");
        Ok(items)
    }
}

/// Parse one listing page into items. Rows missing a title link are skipped.
pub fn parse_page(html: &str, base_url: &str) -> Vec<Item> {
    let document = Html::parse_document(html);
    document
        .select(&ROW)
        .filter_map(|row| {
            let item = parse_row(&document, row, base_url);
            if item.is_none() {
                debug!(id = ?row.value().attr("id"), "Skipping unparseable HN row");
            }
            item
        })
        .collect()
}

fn parse_row(document: &Html, row: ElementRef<'_>, base_url: &str) -> Option<Item> {
    let id = row.value().attr("id")?;
    let link = row.select(&TITLE_LINK).next()?;
    let title = link.text().collect::<String>();
    let href = link.value().attr("href").unwrap_or_default();

    let score = Selector::parse(&format!("#score_{id}"))
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|e| e.text().collect::<String>())
        .unwrap_or_else(|| "0 points".to_string());

    let age = Selector::parse(&format!(r#".age a[href="item?id={id}"]"#))
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|e| e.text().collect::<String>())
        .unwrap_or_default();

    let url = if href.starts_with("item?id=") {
        format!("{base_url}/{href}")
    } else {
        href.to_string()
    };

    Some(
        Item::new("Hacker News", title)
            .with_url(url)
            .with_heat(score)
            .with_time(age),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hn_page(start: usize, count: usize) -> String {
        let mut rows = String::new();
        for id in start..start + count {
            rows.push_str(&format!(
                r#"<tr class="athing" id="{id}">
                     <td class="title"><span class="titleline"><a href="https://example.com/{id}">Story {id}</a></span></td>
                   </tr>
                   <tr><td class="subtext">
                     <span class="score" id="score_{id}">{id} points</span>
                     <span class="age"><a href="item?id={id}">{id} hours ago</a></span>
                   </td></tr>"#
            ));
        }
        format!("<html><body><table>{rows}</table></body></html>")
    }

    fn test_config(base: &str) -> Arc<Config> {
        let mut config = Config::default();
        config.endpoints.hackernews = base.to_string();
        config.collector.hn_page_delay_ms = 0;
        Arc::new(config)
    }

    #[test]
    fn test_parse_page_extracts_fields() {
        let html = hn_page(7, 1);
        let items = parse_page(&html, "https://news.ycombinator.com");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Story 7");
        assert_eq!(items[0].url, "https://example.com/7");
        assert_eq!(items[0].heat, "7 points");
        assert_eq!(items[0].time, "7 hours ago");
    }

    #[test]
    fn test_parse_page_makes_item_links_absolute() {
        let html = r#"<table><tr class="athing" id="42">
            <td><span class="titleline"><a href="item?id=42">Ask HN: Something</a></span></td>
            </tr></table>"#;
        let items = parse_page(html, "https://news.ycombinator.com");
        assert_eq!(items[0].url, "https://news.ycombinator.com/item?id=42");
        assert_eq!(items[0].heat, "0 points");
        assert_eq!(items[0].time, "");
    }

    #[test]
    fn test_parse_page_skips_rows_without_title() {
        let html = r#"<table>
            <tr class="athing" id="1"><td>no link here</td></tr>
            <tr class="athing" id="2"><td><span class="titleline"><a href="https://a">A</a></span></td></tr>
            </table>"#;
        let items = parse_page(html, "https://news.ycombinator.com");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "A");
    }

    #[tokio::test]
    async fn test_paginates_until_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("p", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(hn_page(1, 3)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("p", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(hn_page(4, 3)))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let hn = HackerNews::new(build_client(&config.http).unwrap(), config);
        let items = hn.fetch(5, None).await;
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Story 1", "Story 2", "Story 3", "Story 4", "Story 5"]);
    }

    #[tokio::test]
    async fn test_keyword_misses_stop_at_page_ceiling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string(hn_page(1, 30)))
            .expect(5)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        assert_eq!(config.collector.hn_max_pages, 5);
        let hn = HackerNews::new(build_client(&config.http).unwrap(), config);
        assert!(hn.fetch(10, Some("Haskell")).await.is_empty());
    }

    #[tokio::test]
    async fn test_stops_at_non_ok_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("p", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(hn_page(1, 2)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("p", "2"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let hn = HackerNews::new(build_client(&config.http).unwrap(), config);
        assert_eq!(hn.fetch(10, None).await.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_source_yields_empty() {
        // Nothing listens on port 9 of the loopback interface.
        let config = test_config("http://127.0.0.1:9");
        let hn = HackerNews::new(build_client(&config.http).unwrap(), config);
        assert!(hn.fetch(5, None).await.is_empty());
    }
}
