//! Article body download for `fetch --deep`.
//!
//! Items are enriched concurrently; a page that cannot be fetched simply
//! leaves its item without `content`.

use crate::config::HttpConfig;
use crate::http::{get_text, validate_url};
use crate::models::Item;
use crate::utils::{page_to_text, truncate_chars};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Fetch a page and reduce it to truncated readable text. Empty on any failure.
#[instrument(level = "debug", skip(client, config))]
pub async fn fetch_url_content(client: &Client, config: &HttpConfig, url: &str) -> String {
    if !validate_url(Some(url)) {
        return String::new();
    }
    let timeout = Duration::from_secs(config.content_timeout_secs);
    match get_text(client, url, timeout).await {
        Ok(html) => truncate_chars(&page_to_text(&html), config.content_truncate_chars),
        Err(e) => {
            debug!(%url, error = %e, "Content fetch failed");
            String::new()
        }
    }
}

/// Attach page text to every item whose URL yields some.
#[instrument(level = "info", skip_all, fields(count = items.len()))]
pub async fn enrich_items_with_content(
    client: &Client,
    config: &HttpConfig,
    items: Vec<Item>,
) -> Vec<Item> {
    let workers = config.content_workers.max(1);
    let enriched: Vec<Item> = stream::iter(items)
        .map(|mut item| async move {
            let content = fetch_url_content(client, config, &item.url).await;
            if !content.is_empty() {
                item.content = Some(content);
            }
            item
        })
        .buffered(workers)
        .collect()
        .await;

    let with_content = enriched.iter().filter(|i| i.content.is_some()).count();
    info!(with_content, total = enriched.len(), "Enriched items with page content");
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_enrich_keeps_order_and_skips_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><nav>menu</nav><p>Body text</p></body></html>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = HttpConfig::default();
        let client = build_client(&config).unwrap();
        let items = vec![
            Item::new("t", "ok").with_url(format!("{}/ok", server.uri())),
            Item::new("t", "missing").with_url(format!("{}/missing", server.uri())),
            Item::new("t", "no url"),
        ];

        let enriched = enrich_items_with_content(&client, &config, items).await;
        assert_eq!(enriched[0].content.as_deref(), Some("Body text"));
        assert!(enriched[1].content.is_none());
        assert!(enriched[2].content.is_none());
        assert_eq!(enriched[2].title, "no url");
    }

    #[tokio::test]
    async fn test_content_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(format!("<p>{}</p>", "x".repeat(50))),
            )
            .mount(&server)
            .await;

        let config = HttpConfig {
            content_truncate_chars: 10,
            ..Default::default()
        };
        let client = build_client(&config).unwrap();
        let text = fetch_url_content(&client, &config, &server.uri()).await;
        assert_eq!(text, "x".repeat(10));
    }
}
