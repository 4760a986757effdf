//! Minimal RSS 2.0 / Atom reader.
//!
//! Both formats are decoded with `quick_xml`'s serde support into a common
//! [`Feed`] of [`FeedEntry`] values. Only the fields the sensors need are
//! mapped; everything else in the document is ignored.

use crate::error::{FetchError, Result};
use chrono::{DateTime, FixedOffset};
use quick_xml::de::from_str;
use serde::Deserialize;

/// Text content of an element, ignoring its attributes.
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

fn text(node: Option<TextNode>) -> String {
    node.map(|n| n.value.trim().to_string()).unwrap_or_default()
}

fn first_text(nodes: Vec<TextNode>) -> String {
    nodes
        .into_iter()
        .map(|n| n.value.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    title: Option<TextNode>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<TextNode>,
    #[serde(rename = "pubDate")]
    pub_date: Option<TextNode>,
    description: Option<TextNode>,
    guid: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<TextNode>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<TextNode>,
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<TextNode>,
    updated: Option<TextNode>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomPerson>,
    #[serde(rename = "category", default)]
    categories: Vec<AtomCategory>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomPerson {
    name: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct AtomCategory {
    #[serde(rename = "@term", default)]
    term: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub title: String,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    /// Publication date exactly as it appeared in the feed.
    pub published_raw: String,
    pub published: Option<DateTime<FixedOffset>>,
    /// Entry body (Atom `content`, else `summary`; RSS `description`), still HTML.
    pub body: String,
    /// Atom `summary` when the entry also carries `content`.
    pub summary: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

/// Parse an RSS 2.0 or Atom document.
pub fn parse_feed(xml: &str) -> Result<Feed> {
    let xml = scrub_html_entities(xml);
    if is_atom(&xml) {
        let atom: AtomFeed = from_str(&xml)?;
        Ok(from_atom(atom))
    } else if xml.contains("<rss") || xml.contains("<channel") {
        let rss: Rss = from_str(&xml)?;
        Ok(from_rss(rss))
    } else {
        Err(FetchError::Parse("document is neither RSS nor Atom".to_string()))
    }
}

fn is_atom(xml: &str) -> bool {
    match (xml.find("<feed"), xml.find("<rss")) {
        (Some(feed), Some(rss)) => feed < rss,
        (Some(_), None) => true,
        _ => false,
    }
}

fn from_rss(rss: Rss) -> Feed {
    let entries = rss
        .channel
        .items
        .into_iter()
        .map(|item| {
            let published_raw = text(item.pub_date);
            let link = first_text(item.links);
            FeedEntry {
                id: text(item.guid),
                title: text(item.title),
                published: DateTime::parse_from_rfc2822(&published_raw).ok(),
                published_raw,
                link,
                body: text(item.description),
                ..Default::default()
            }
        })
        .collect();
    Feed {
        title: text(rss.channel.title),
        entries,
    }
}

fn from_atom(atom: AtomFeed) -> Feed {
    let entries = atom
        .entries
        .into_iter()
        .map(|entry| {
            let link = pick_link(&entry.links);
            let published = text(entry.published);
            let published_raw = if published.is_empty() {
                text(entry.updated)
            } else {
                published
            };
            let summary = text(entry.summary);
            let content = text(entry.content);
            let body = if content.is_empty() {
                summary.clone()
            } else {
                content
            };
            FeedEntry {
                id: text(entry.id),
                title: text(entry.title),
                link,
                published: DateTime::parse_from_rfc3339(&published_raw).ok(),
                published_raw,
                body,
                summary,
                authors: entry
                    .authors
                    .into_iter()
                    .map(|a| text(a.name))
                    .filter(|n| !n.is_empty())
                    .collect(),
                categories: entry
                    .categories
                    .into_iter()
                    .map(|c| c.term)
                    .filter(|t| !t.is_empty())
                    .collect(),
            }
        })
        .collect();
    Feed {
        title: text(atom.title),
        entries,
    }
}

/// Prefer the `alternate` (or rel-less) link, else the first one.
fn pick_link(links: &[AtomLink]) -> String {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

/// HTML named entities that are not valid XML but show up in real feeds.
fn scrub_html_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
