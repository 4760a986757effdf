//! Data models for collected intelligence.
//!
//! - [`Item`]: one normalized entry produced by a fetcher or sensor
//! - [`Category`]: the fixed report buckets items are tagged into
//! - [`IntelligenceBundle`]: the per-run mapping of category to items
//!
//! The bundle is built fresh for every run and is never persisted; the
//! serialized form is a flat JSON object keyed by category name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of an item's payload.
///
/// Most sources yield discrete entries. The social sensor yields a single
/// free-text Markdown block which the report renders verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Entry,
    MarkdownReport,
}

/// A single normalized piece of intelligence.
///
/// `heat` and `time` are free-form display strings. Their units differ per
/// source (points, stars, replies, "1h", "Today") and are never compared
/// across sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Origin name, e.g. "Hacker News".
    pub source: String,
    /// Source label the item is shown under, e.g. "GitHub".
    #[serde(default)]
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub heat: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grok_review: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: ItemKind,
}

impl Item {
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_heat(mut self, heat: impl Into<String>) -> Self {
        self.heat = heat.into();
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// The fixed report buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TechTrends,
    CapitalFlow,
    ProductGems,
    Community,
    Research,
    Social,
    XhsDirectives,
    Insights,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::TechTrends,
        Category::CapitalFlow,
        Category::ProductGems,
        Category::Community,
        Category::Research,
        Category::Social,
        Category::XhsDirectives,
        Category::Insights,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::TechTrends => "tech_trends",
            Category::CapitalFlow => "capital_flow",
            Category::ProductGems => "product_gems",
            Category::Community => "community",
            Category::Research => "research",
            Category::Social => "social",
            Category::XhsDirectives => "xhs_directives",
            Category::Insights => "insights",
        }
    }

    /// Whether the collector deduplicates this category.
    ///
    /// Only the externally scraped buckets are deduplicated: they are the
    /// ones fed by several sources at once.
    pub fn is_deduplicated(self) -> bool {
        matches!(
            self,
            Category::TechTrends | Category::CapitalFlow | Category::Community
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run mapping from category to items.
///
/// One field per category, so every key is present even when a run
/// collected nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceBundle {
    pub tech_trends: Vec<Item>,
    pub capital_flow: Vec<Item>,
    pub product_gems: Vec<Item>,
    pub community: Vec<Item>,
    pub research: Vec<Item>,
    pub social: Vec<Item>,
    pub xhs_directives: Vec<Item>,
    pub insights: Vec<Item>,
}

impl IntelligenceBundle {
    pub fn get(&self, category: Category) -> &[Item] {
        match category {
            Category::TechTrends => &self.tech_trends,
            Category::CapitalFlow => &self.capital_flow,
            Category::ProductGems => &self.product_gems,
            Category::Community => &self.community,
            Category::Research => &self.research,
            Category::Social => &self.social,
            Category::XhsDirectives => &self.xhs_directives,
            Category::Insights => &self.insights,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<Item> {
        match category {
            Category::TechTrends => &mut self.tech_trends,
            Category::CapitalFlow => &mut self.capital_flow,
            Category::ProductGems => &mut self.product_gems,
            Category::Community => &mut self.community,
            Category::Research => &mut self.research,
            Category::Social => &mut self.social,
            Category::XhsDirectives => &mut self.xhs_directives,
            Category::Insights => &mut self.insights,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Item])> {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
