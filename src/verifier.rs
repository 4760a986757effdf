//! Link reachability checks for LLM-written Markdown.
//!
//! Links are annotated, never removed: a reader still sees what the model
//! cited, with a marker on the ones that did not resolve.

use crate::config::VerifierConfig;
use crate::http::validate_url;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::{Client, StatusCode};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\((https?://[^)\s]+)\)").expect("valid link regex"));

pub const FAILED_LINK_MARKER: &str = " **(⚠️ link verification failed/404)**";

const VERIFY_WORKERS: usize = 8;

pub struct LinkVerifier {
    client: Client,
    timeout: Duration,
    skip_domains: Vec<String>,
}

impl LinkVerifier {
    pub fn new(client: Client, config: &VerifierConfig) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            skip_domains: config
                .skip_domains
                .iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// HEAD first; a 404 is final, anything else is retried as GET.
    #[instrument(level = "debug", skip(self))]
    pub async fn verify(&self, url: &str) -> bool {
        if !validate_url(Some(url)) {
            return false;
        }
        match self.client.head(url).timeout(self.timeout).send().await {
            Ok(resp) if resp.status() == StatusCode::NOT_FOUND => return false,
            Ok(resp) => debug!(status = resp.status().as_u16(), "HEAD not conclusive, trying GET"),
            Err(e) => debug!(error = %e, "HEAD failed, trying GET"),
        }
        match self.client.get(url).timeout(self.timeout).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, "GET failed");
                false
            }
        }
    }

    fn is_skipped(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        else {
            return false;
        };
        self.skip_domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }

    /// Append a marker after every Markdown link that fails [`verify`](Self::verify).
    #[instrument(level = "info", skip_all, fields(len = text.len()))]
    pub async fn validate_links(&self, text: &str) -> String {
        let mut seen = HashSet::new();
        let to_check: Vec<String> = MARKDOWN_LINK
            .captures_iter(text)
            .map(|c| c[2].to_string())
            .filter(|u| !self.is_skipped(u))
            .filter(|u| seen.insert(u.clone()))
            .collect();
        if to_check.is_empty() {
            return text.to_string();
        }

        let results: HashMap<String, bool> = stream::iter(to_check)
            .map(|url| async move {
                let ok = self.verify(&url).await;
                (url, ok)
            })
            .buffer_unordered(VERIFY_WORKERS)
            .collect()
            .await;

        let failed = results.values().filter(|ok| !**ok).count();
        info!(checked = results.len(), failed, "Validated links");
        if failed == 0 {
            return text.to_string();
        }

        MARKDOWN_LINK
            .replace_all(text, |caps: &Captures| {
                let whole = &caps[0];
                match results.get(&caps[2]) {
                    Some(false) => format!("{whole}{FAILED_LINK_MARKER}"),
                    _ => whole.to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn verifier() -> LinkVerifier {
        let config = VerifierConfig {
            timeout_secs: 2,
            ..Default::default()
        };
        LinkVerifier::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_head_404_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        assert!(!verifier().verify(&server.uri()).await);
    }

    #[tokio::test]
    async fn test_head_405_falls_back_to_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        assert!(verifier().verify(&server.uri()).await);
    }

    #[tokio::test]
    async fn test_invalid_and_unreachable_urls() {
        let v = verifier();
        assert!(!v.verify("ftp://example.com").await);
        assert!(!v.verify("").await);
        assert!(!v.verify("http://127.0.0.1:9/").await);
    }

    #[tokio::test]
    async fn test_text_without_links_is_unchanged() {
        let text = "## Trends\nNothing to cite today.";
        assert_eq!(verifier().validate_links(text).await, text);
    }

    #[tokio::test]
    async fn test_skip_listed_links_are_untouched() {
        let text = "See [post](https://twitter.com/a/status/1) and [thread](https://mobile.x.com/b).";
        assert_eq!(verifier().validate_links(text).await, text);
    }

    #[tokio::test]
    async fn test_failed_links_get_marker() {
        let server = MockServer::start().await;
        Mock::given(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ok = format!("{}/ok", server.uri());
        let gone = format!("{}/gone", server.uri());
        let text = format!("[a]({ok}) then [b]({gone}) and again [c]({gone})");
        let out = verifier().validate_links(&text).await;

        assert_eq!(
            out,
            format!("[a]({ok}) then [b]({gone}){FAILED_LINK_MARKER} and again [c]({gone}){FAILED_LINK_MARKER}")
        );
    }

    #[test]
    fn test_skip_matches_subdomains_only() {
        let v = verifier();
        assert!(v.is_skipped("https://x.com/foo"));
        assert!(v.is_skipped("https://m.weibo.com/1"));
        assert!(!v.is_skipped("https://notx.com/foo"));
        assert!(!v.is_skipped("https://github.com/x.com"));
    }
}
