//! Recent posts from the blogs Hacker News readers follow most.

use super::Sensor;
use crate::config::Config;
use crate::error::Result;
use crate::feed::{FeedEntry, parse_feed};
use crate::http::get_text;
use crate::models::{Category, Item};
use crate::utils::{fragment_to_text, truncate_chars};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const NAME: &str = "hn_blogs";

#[derive(Debug, Clone)]
struct Post {
    blog: String,
    entry: FeedEntry,
}

pub struct HnBlogs {
    client: Client,
    config: Arc<Config>,
}

impl HnBlogs {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    /// The newest `articles_per_blog` posts of one feed. Empty on failure.
    #[instrument(level = "debug", skip(self))]
    async fn read_blog(&self, feed_url: &str) -> Vec<Post> {
        let timeout = Duration::from_secs(self.config.sensors.rss_timeout_secs);
        let xml = match get_text(&self.client, feed_url, timeout).await {
            Ok(xml) => xml,
            Err(e) => {
                warn!(%feed_url, error = %e, "Blog feed unavailable");
                return Vec::new();
            }
        };
        let feed = match parse_feed(&xml) {
            Ok(feed) => feed,
            Err(e) => {
                warn!(%feed_url, error = %e, "Blog feed unparseable");
                return Vec::new();
            }
        };

        let blog = if feed.title.is_empty() {
            feed_url.to_string()
        } else {
            feed.title
        };
        let mut entries = feed.entries;
        sort_newest_first(&mut entries, |e| e.published);
        entries
            .into_iter()
            .filter(|e| !e.title.is_empty())
            .take(self.config.sensors.articles_per_blog)
            .map(|entry| Post {
                blog: blog.clone(),
                entry,
            })
            .collect()
    }

    fn into_item(&self, post: Post) -> Item {
        let entry = post.entry;
        let text = fragment_to_text(&entry.body);
        let mut item = Item::new("HN Top Blogs", entry.title)
            .with_category("HN Blogs")
            .with_url(entry.link)
            .with_time(
                entry
                    .published
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or(entry.published_raw),
            );
        item.author = Some(post.blog);
        if !text.is_empty() {
            item.content = Some(truncate_chars(&text, self.config.http.content_truncate_chars));
        }
        item
    }
}

/// Stable sort by date, newest first, undated entries last.
fn sort_newest_first<T>(items: &mut [T], date: impl Fn(&T) -> Option<DateTime<FixedOffset>>) {
    items.sort_by_key(|item| (date(item).is_none(), Reverse(date(item))));
}

#[async_trait]
impl Sensor for HnBlogs {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> Category {
        Category::Insights
    }

    fn effective_limit(&self, _requested: usize) -> usize {
        self.config.sensors.blog_limit
    }

    async fn collect(&self, limit: usize) -> Result<Vec<Item>> {
        let feeds: Vec<String> = self
            .config
            .sensors
            .blog_feeds
            .iter()
            .take(self.config.sensors.max_blogs)
            .cloned()
            .collect();
        let workers = feeds.len().max(1);

        let mut posts: Vec<Post> = stream::iter(feeds)
            .map(|url| async move { self.read_blog(&url).await })
            .buffer_unordered(workers)
            .flat_map(stream::iter)
            .collect()
            .await;

        info!(posts = posts.len(), "Read blog feeds");
        sort_newest_first(&mut posts, |p| p.entry.published);
        Ok(posts
            .into_iter()
            .take(limit)
            .map(|p| self.into_item(p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BLOG_A: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Blog A</title>
  <item><title>A old</title><link>https://a.example/old</link><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate></item>
  <item><title>A new</title><link>https://a.example/new</link><pubDate>Wed, 15 Oct 2025 00:00:00 GMT</pubDate><description>&lt;p&gt;Fresh &lt;b&gt;take&lt;/b&gt;&lt;/p&gt;</description></item>
  <item><title>A mid</title><link>https://a.example/mid</link><pubDate>Sat, 01 Mar 2025 00:00:00 GMT</pubDate></item>
</channel></rss>"#;

    const BLOG_B: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>Blog B</title>
  <entry><title>B undated</title><link href="https://b.example/x"/></entry>
  <entry><title>B recent</title><link href="https://b.example/y"/><published>2025-06-01T00:00:00Z</published></entry>
</feed>"#;

    async fn sensor(server: &MockServer, blog_limit: usize) -> HnBlogs {
        Mock::given(method("GET"))
            .and(path("/a.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BLOG_A))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BLOG_B))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/down.xml"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;

        let mut config = Config::default();
        config.sensors.blog_feeds = ["a.xml", "b.xml", "down.xml"]
            .iter()
            .map(|p| format!("{}/{p}", server.uri()))
            .collect();
        config.sensors.blog_limit = blog_limit;
        HnBlogs::new(Client::new(), Arc::new(config))
    }

    #[tokio::test]
    async fn test_newest_posts_across_blogs() {
        let server = MockServer::start().await;
        let blogs = sensor(&server, 5).await;
        let limit = blogs.effective_limit(30);
        assert_eq!(limit, 5);

        let items = blogs.collect(limit).await.unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A new", "B recent", "A mid", "B undated"]);

        assert_eq!(items[0].author.as_deref(), Some("Blog A"));
        assert_eq!(items[0].content.as_deref(), Some("Fresh take"));
        assert_eq!(items[0].time, "2025-10-15");
        assert_eq!(items[0].source, "HN Top Blogs");
    }

    #[tokio::test]
    async fn test_limit_applies_after_merge() {
        let server = MockServer::start().await;
        let blogs = sensor(&server, 2).await;
        let items = blogs.collect(blogs.effective_limit(10)).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title, "B recent");
    }

    #[tokio::test]
    async fn test_reads_at_most_max_blogs_feeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BLOG_A))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BLOG_B))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.sensors.blog_feeds = vec![
            format!("{}/a.xml", server.uri()),
            format!("{}/b.xml", server.uri()),
        ];
        config.sensors.max_blogs = 1;
        let blogs = HnBlogs::new(Client::new(), Arc::new(config));

        let items = blogs.collect(10).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.author.as_deref() == Some("Blog A")));
    }

    #[test]
    fn test_sort_puts_undated_last() {
        let d = |s: &str| DateTime::parse_from_rfc3339(s).ok();
        let mut dates = vec![None, d("2024-01-01T00:00:00Z"), d("2025-01-01T00:00:00Z")];
        sort_newest_first(&mut dates, |x| *x);
        assert_eq!(dates[0], d("2025-01-01T00:00:00Z"));
        assert!(dates[2].is_none());
    }
}
