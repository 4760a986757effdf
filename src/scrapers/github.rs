//! GitHub Trending scraper.

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

static REPO_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.Box-row").expect("valid selector"));
static REPO_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("h2 a").expect("valid selector"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));
static STARS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href$="/stargazers"]"#).expect("valid selector"));

pub struct GithubTrending {
    client: Client,
    config: Arc<Config>,
}

impl GithubTrending {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SourceFetcher for GithubTrending {
    fn key(&self) -> &'static str {
        "github"
    }

    fn name(&self) -> &'static str {
        "GitHub Trending"
    }

    #[instrument(level = "info", skip(self))]
    async fn try_fetch(&self, limit: usize, keyword: Option<&str>) -> Result<Vec<Item>> {
        let url = &self.config.endpoints.github_trending;
        let html = get_text(&self.client, url, self.config.http.source_timeout()).await?;
        Ok(filter_and_limit(parse_trending(&html), keyword, limit))
    }
}

/// Parse the trending page. Title is `owner/repo - description`.
pub fn parse_trending(html: &str) -> Vec<Item> {
    let document = Html::parse_document(html);
    document
        .select(&REPO_ROW)
        .filter_map(|row| {
            let item = parse_repo(row);
            if item.is_none() {
                debug!("Skipping unparseable GitHub row");
            }
            item
        })
        .collect()
}

fn parse_repo(row: ElementRef<'_>) -> Option<Item> {
    let link = row.select(&REPO_LINK).next()?;
    let href = link.value().attr("href")?;
    let repo: String = link
        .text()
        .collect::<String>()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let description = row
        .select(&DESCRIPTION)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let stars = row
        .select(&STARS)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    Some(
        Item::new("GitHub Trending", format!("{repo} - {description}"))
            .with_url(format!("https://github.com{href}"))
            .with_heat(format!("{stars} stars"))
            .with_time("Today"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TRENDING: &str = r#"<html><body>
        <article class="Box-row">
          <h2 class="h3 lh-condensed">
            <a href="/rust-lang/rust">
              rust-lang /
              rust
            </a>
          </h2>
          <p class="col-9">  Empowering everyone to build reliable software. </p>
          <a href="/rust-lang/rust/stargazers"> 101,234 </a>
        </article>
        <article class="Box-row"><p>no heading</p></article>
        <article class="Box-row">
          <h2><a href="/tokio-rs/tokio">tokio-rs / tokio</a></h2>
        </article>
        </body></html>"#;

    #[test]
    fn test_parse_trending() {
        let items = parse_trending(TRENDING);
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].title,
            "rust-lang/rust - Empowering everyone to build reliable software."
        );
        assert_eq!(items[0].url, "https://github.com/rust-lang/rust");
        assert_eq!(items[0].heat, "101,234 stars");
        assert_eq!(items[0].time, "Today");
        assert_eq!(items[1].title, "tokio-rs/tokio - ");
    }

    #[tokio::test]
    async fn test_keyword_then_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TRENDING))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.endpoints.github_trending = server.uri();
        let config = Arc::new(config);
        let fetcher = GithubTrending::new(build_client(&config.http).unwrap(), config);

        let items = fetcher.fetch(5, Some("tokio")).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://github.com/tokio-rs/tokio");
    }

    #[tokio::test]
    async fn test_server_error_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string(TRENDING))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.endpoints.github_trending = server.uri();
        let config = Arc::new(config);
        let fetcher = GithubTrending::new(build_client(&config.http).unwrap(), config);
        assert!(fetcher.fetch(5, None).await.is_empty());
    }
}
