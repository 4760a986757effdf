//! Markdown briefing rendered from an [`IntelligenceBundle`].
//!
//! Sections appear only for categories that have items, each capped at a
//! fixed number of entries. XHS search directives stay in the bundle (and
//! the JSON dump) but are not rendered.

use crate::models::{IntelligenceBundle, Item, ItemKind};

const TECH_CAP: usize = 10;
const CAPITAL_CAP: usize = 10;
const RESEARCH_CAP: usize = 5;
const PRODUCT_CAP: usize = 8;
const COMMUNITY_CAP: usize = 5;
const INSIGHTS_CAP: usize = 5;

/// Render the daily briefing.
pub fn render_report(bundle: &IntelligenceBundle, date: &str, generated_at: &str) -> String {
    render(bundle, "🌐 Global Intel Briefing", date, generated_at)
}

/// Render a briefing covering the last `days` days.
pub fn render_periodic_report(
    bundle: &IntelligenceBundle,
    days: u32,
    date: &str,
    generated_at: &str,
) -> String {
    let title = format!("🌐 Periodic Intel Briefing (last {days} days)");
    render(bundle, &title, date, generated_at)
}

fn active_sources(bundle: &IntelligenceBundle) -> Vec<&'static str> {
    let mut sources = Vec::new();
    if !bundle.tech_trends.is_empty() {
        sources.extend(["HN", "GitHub"]);
    }
    if !bundle.capital_flow.is_empty() {
        sources.extend(["36Kr", "WallStreetCN"]);
    }
    if !bundle.community.is_empty() {
        sources.push("V2EX");
    }
    if !bundle.product_gems.is_empty() {
        sources.push("PH");
    }
    if !bundle.research.is_empty() {
        sources.push("ArXiv");
    }
    if !bundle.social.is_empty() {
        sources.push("X");
    }
    if !bundle.insights.is_empty() {
        sources.push("Blogs");
    }
    sources
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

fn heading(lines: &mut Vec<String>, i: usize, item: &Item) {
    lines.push(format!(
        "### {i}. [{}]({})",
        or(&item.title, "Untitled"),
        or(&item.url, "#")
    ));
}

fn render(bundle: &IntelligenceBundle, title: &str, date: &str, generated_at: &str) -> String {
    let sources = active_sources(bundle);
    let mut lines = vec![
        format!("# {title}"),
        format!("**Date:** {date}"),
        format!("**Generated:** {generated_at}"),
        format!(
            "**Sources:** {}",
            if sources.is_empty() {
                "none".to_string()
            } else {
                sources.join(", ")
            }
        ),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    if !bundle.tech_trends.is_empty() {
        lines.push("## 🛠️ Tech Trends".to_string());
        lines.push("> Hacker News + GitHub Trending\n".to_string());
        for (i, item) in bundle.tech_trends.iter().take(TECH_CAP).enumerate() {
            heading(&mut lines, i + 1, item);
            lines.push(format!("📍 {} | 🔥 {} | 🕒 {}", item.category, item.heat, item.time));
            lines.push(String::new());
        }
    }

    if !bundle.capital_flow.is_empty() {
        lines.push("## 💰 Capital Flow".to_string());
        lines.push("> 36Kr + WallStreetCN\n".to_string());
        for (i, item) in bundle.capital_flow.iter().take(CAPITAL_CAP).enumerate() {
            heading(&mut lines, i + 1, item);
            lines.push(format!("📍 {} | 🕒 {}", item.category, item.time));
            lines.push(String::new());
        }
    }

    if !bundle.research.is_empty() {
        lines.push("## 📚 Research".to_string());
        lines.push("> ArXiv AI/ML Papers\n".to_string());
        for (i, item) in bundle.research.iter().take(RESEARCH_CAP).enumerate() {
            heading(&mut lines, i + 1, item);
            lines.push(format!(
                "👤 {} | 📅 {}",
                item.authors.as_deref().unwrap_or_default(),
                item.time
            ));
            if let Some(summary) = item.summary.as_deref().filter(|s| !s.is_empty()) {
                lines.push(String::new());
                lines.push(format!("**Abstract:** {}", summary.replace('\n', " ")));
            }
            lines.push(String::new());
        }
    }

    if !bundle.product_gems.is_empty() {
        lines.push("## 💎 Product Gems".to_string());
        lines.push("> Product Hunt Today\n".to_string());
        for (i, item) in bundle.product_gems.iter().take(PRODUCT_CAP).enumerate() {
            heading(&mut lines, i + 1, item);
            lines.push(format!("> {}", item.tagline.as_deref().unwrap_or_default()));
            lines.push(format!("🔥 {}", item.heat));
            lines.push(String::new());
            if let Some(review) = item.grok_review.as_deref() {
                lines.push(format!("> **🦅 Grok sentiment check**: {review}"));
                lines.push(String::new());
            }
        }
    }

    if !bundle.social.is_empty() {
        lines.push("## 🐦 Social".to_string());
        lines.push("> X (Twitter) - AI/Tech Discussions\n".to_string());
        for item in &bundle.social {
            match item.kind {
                ItemKind::MarkdownReport => {
                    lines.push(format!("> Source: {}\n", or(&item.source, "X")));
                    lines.push(
                        item.content
                            .clone()
                            .unwrap_or_else(|| "*No content*".to_string()),
                    );
                }
                ItemKind::Entry => {
                    lines.push(format!("### {}", item.author.as_deref().unwrap_or_default()));
                    lines.push(format!("> {}", item.title));
                    lines.push(format!("❤️ {} | 🔗 [Link]({})", item.heat, or(&item.url, "#")));
                }
            }
            lines.push(String::new());
        }
    }

    if !bundle.community.is_empty() {
        lines.push("## 🗣️ Community".to_string());
        lines.push("> V2EX Hot\n".to_string());
        for (i, item) in bundle.community.iter().take(COMMUNITY_CAP).enumerate() {
            heading(&mut lines, i + 1, item);
            lines.push(format!("💬 {}", item.heat));
            lines.push(String::new());
        }
    }

    if !bundle.insights.is_empty() {
        lines.push("## 💡 Insights".to_string());
        lines.push("> HN Top Blogs\n".to_string());
        for (i, item) in bundle.insights.iter().take(INSIGHTS_CAP).enumerate() {
            heading(&mut lines, i + 1, item);
            let author = item.author.as_deref().unwrap_or_default();
            if item.time.is_empty() {
                lines.push(format!("📍 {author}"));
            } else {
                lines.push(format!("📍 {author} | 📅 {}", item.time));
            }
            lines.push(String::new());
        }
    }

    if sources.is_empty() {
        lines.push("*No data was collected for this briefing.*".to_string());
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push("*Generated automatically by intel_briefing*".to_string());
    lines.join("\n")
}
