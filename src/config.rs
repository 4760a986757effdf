//! Run configuration.
//!
//! A [`Config`] is built once at startup (defaults, optionally overlaid by a
//! YAML file, then by CLI/env credentials) and handed to the collector and
//! every fetcher and sensor. Nothing below this module reads the environment.
//!
//! ```yaml
//! collector:
//!   external_workers: 5
//! sensors:
//!   disabled: [xhs]
//!   arxiv_retry_delay_ms: 1000
//! ```

use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub collector: CollectorConfig,
    pub endpoints: Endpoints,
    pub sensors: SensorsConfig,
    pub llm: LlmConfig,
    pub verifier: VerifierConfig,
}

impl Config {
    /// Load from a YAML file, or fall back to defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let config = Self::from_yaml(&raw)?;
                info!(path = %path.display(), "Loaded configuration file");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Timeout applied by the shared client to every request.
    pub default_timeout_secs: u64,
    /// Per-call timeout for the scraped list pages.
    pub source_timeout_secs: u64,
    /// Per-call timeout for `fetch --deep` page downloads.
    pub content_timeout_secs: u64,
    pub content_truncate_chars: usize,
    pub content_workers: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_timeout_secs: 15,
            source_timeout_secs: 10,
            content_timeout_secs: 5,
            content_truncate_chars: 3000,
            content_workers: 10,
        }
    }
}

impl HttpConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Worker cap for the external scraping batch.
    pub external_workers: usize,
    /// Worker cap for the top-level group (external batch plus sensors).
    pub sensor_workers: usize,
    pub hn_max_pages: usize,
    pub hn_page_delay_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            external_workers: 5,
            sensor_workers: 8,
            hn_max_pages: 5,
            hn_page_delay_ms: 500,
        }
    }
}

/// Base URLs of every external source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub hackernews: String,
    pub github_trending: String,
    pub kr36: String,
    pub wallstreetcn: String,
    pub v2ex: String,
    pub weibo: String,
    pub tencent: String,
    pub producthunt_feed: String,
    pub arxiv: String,
    pub xhs_search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            hackernews: "https://news.ycombinator.com".to_string(),
            github_trending: "https://github.com/trending".to_string(),
            kr36: "https://36kr.com/newsflashes".to_string(),
            wallstreetcn: "https://api-one.wallstcn.com/apiv1/content/information-flow?channel=global-channel&accept=article&limit=30".to_string(),
            v2ex: "https://www.v2ex.com/api/topics/hot.json".to_string(),
            weibo: "https://weibo.com/ajax/side/hotSearch".to_string(),
            tencent: "https://i.news.qq.com/web_backend/v2/getTagInfo?tagId=aEWqxLtdgmQ%3D".to_string(),
            producthunt_feed: "https://www.producthunt.com/feed".to_string(),
            arxiv: "https://export.arxiv.org/api/query".to_string(),
            xhs_search: "https://www.xiaohongshu.com/search_result".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Sensor names switched off for the run: `product_hunt`, `arxiv`,
    /// `social`, `xhs`, `hn_blogs`.
    pub disabled: Vec<String>,
    pub arxiv_timeout_secs: u64,
    pub arxiv_retry_delay_ms: u64,
    pub arxiv_min_response_bytes: usize,
    /// How many of the top Product Hunt entries get an LLM review.
    pub product_reviews: usize,
    pub social_topic: String,
    pub xhs_limit: usize,
    pub xhs_queries: Vec<String>,
    pub xhs_keywords: Vec<String>,
    pub blog_feeds: Vec<String>,
    pub blog_limit: usize,
    pub max_blogs: usize,
    pub articles_per_blog: usize,
    pub rss_timeout_secs: u64,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            arxiv_timeout_secs: 30,
            arxiv_retry_delay_ms: 3000,
            arxiv_min_response_bytes: 500,
            product_reviews: 3,
            social_topic: "AI Agents, LLM, Tech Startups".to_string(),
            xhs_limit: 8,
            xhs_queries: [
                "毕设求助",
                "python代做",
                "数据分析 救命",
                "竞品分析 工具",
                "批量 采集 小红书",
                "自动回复 脚本",
                "闲鱼 助手",
                "Excel 自动化",
                "批量 转 PDF",
                "自动填表",
                "发票 识别",
                "视频 批量 剪辑",
                "去水印 工具",
                "文案 生成",
                "矩阵 运营",
            ]
            .map(String::from)
            .to_vec(),
            xhs_keywords: ["救命", "有偿", "急", "我要疯了", "红包", "太难了", "求教"]
                .map(String::from)
                .to_vec(),
            blog_feeds: [
                "https://simonwillison.net/atom/everything/",
                "https://www.jeffgeerling.com/blog.xml",
                "https://daringfireball.net/feeds/main",
                "https://krebsonsecurity.com/feed/",
                "https://mitchellh.com/feed.xml",
                "https://danluu.com/atom.xml",
                "https://rachelbythebay.com/w/atom.xml",
                "https://overreacted.io/rss.xml",
                "https://www.righto.com/feeds/posts/default",
                "https://eli.thegreenplace.net/feeds/all.atom.xml",
                "https://fasterthanli.me/index.xml",
                "https://www.troyhunt.com/rss/",
                "https://matklad.github.io/feed.xml",
                "https://jvns.ca/atom.xml",
                "https://lcamtuf.substack.com/feed",
                "https://blog.pragmaticengineer.com/rss/",
            ]
            .map(String::from)
            .to_vec(),
            blog_limit: 5,
            max_blogs: 20,
            articles_per_blog: 2,
            rss_timeout_secs: 10,
        }
    }
}

impl SensorsConfig {
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d.trim().eq_ignore_ascii_case(name))
    }
}

/// OpenAI-compatible chat endpoint used by the social sensor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Populated from `--xai-api-key` / `XAI_API_KEY`; never from YAML in practice.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.x.ai/v1/chat/completions".to_string(),
            model: "grok-beta".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            retry_base_delay_ms: 1000,
        }
    }
}

impl LlmConfig {
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    /// Hosts that block HEAD/GET probes; links to them are never checked.
    pub skip_domains: Vec<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 5,
            skip_domains: ["twitter.com", "x.com", "weibo.com", "xiaohongshu.com"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_collector_limits() {
        let config = Config::default();
        assert_eq!(config.collector.external_workers, 5);
        assert_eq!(config.collector.sensor_workers, 8);
        assert_eq!(config.sensors.blog_limit, 5);
        assert_eq!(config.sensors.xhs_limit, 8);
        assert!(config.endpoints.arxiv.starts_with("https://"));
        assert!(!config.llm.has_credentials());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let raw = r#"
collector:
  external_workers: 2
sensors:
  disabled: [XHS, arxiv]
verifier:
  enabled: false
"#;
        let config = Config::from_yaml(raw).unwrap();
        assert_eq!(config.collector.external_workers, 2);
        assert_eq!(config.collector.sensor_workers, 8);
        assert!(config.sensors.is_disabled("xhs"));
        assert!(config.sensors.is_disabled("arxiv"));
        assert!(!config.sensors.is_disabled("social"));
        assert!(!config.verifier.enabled);
        assert_eq!(config.verifier.skip_domains.len(), 4);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("   \n").unwrap();
        assert_eq!(config.http.content_truncate_chars, 3000);
    }

    #[test]
    fn test_blank_api_key_is_not_a_credential() {
        let llm = LlmConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!llm.has_credentials());
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
    }
}
