//! Shared HTTP plumbing for fetchers and sensors.
//!
//! One [`reqwest::Client`] is built per run and cloned into every task
//! (clones share the connection pool). The helpers here turn transport
//! errors and non-success statuses into [`FetchError`] so callers can use `?`.

use crate::config::HttpConfig;
use crate::error::{FetchError, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Build the shared client with a browser-like user agent and default timeout.
pub fn build_client(config: &HttpConfig) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(&config.user_agent) {
        headers.insert(USER_AGENT, ua);
    }
    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.default_timeout_secs))
        .build()
}

/// Accept only `http://` and `https://` URLs.
pub fn validate_url(url: Option<&str>) -> bool {
    url.is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"))
}

async fn send_checked(request: RequestBuilder, url: &str) -> Result<Response> {
    if !validate_url(Some(url)) {
        return Err(FetchError::InvalidUrl(url.to_string()));
    }
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        debug!(%url, status = status.as_u16(), "Non-success response");
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

/// GET a page body, failing on non-2xx.
pub async fn get_text(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    get_text_with(client.get(url).timeout(timeout), url).await
}

/// Like [`get_text`], for callers that need extra headers on the request.
pub async fn get_text_with(request: RequestBuilder, url: &str) -> Result<String> {
    let response = send_checked(request, url).await?;
    Ok(response.text().await?)
}

/// GET and decode a JSON body, failing on non-2xx.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<T> {
    get_json_with(client.get(url).timeout(timeout), url).await
}

pub async fn get_json_with<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T> {
    let response = send_checked(request, url).await?;
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_validate_url() {
        assert!(validate_url(Some("https://example.com")));
        assert!(validate_url(Some("http://example.com")));
        assert!(!validate_url(Some("ftp://example.com")));
        assert!(!validate_url(Some("")));
        assert!(!validate_url(None));
    }

    #[tokio::test]
    async fn test_get_text_rejects_non_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = build_client(&HttpConfig::default()).unwrap();
        let url = format!("{}/gone", server.uri());
        let err = get_text(&client, &url, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_get_json_reports_parse_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = build_client(&HttpConfig::default()).unwrap();
        let res: Result<serde_json::Value> =
            get_json(&client, &server.uri(), Duration::from_secs(2)).await;
        assert!(matches!(res, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_non_http_url_is_rejected_before_sending() {
        let client = build_client(&HttpConfig::default()).unwrap();
        let err = get_text(&client, "ftp://example.com/feed", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
