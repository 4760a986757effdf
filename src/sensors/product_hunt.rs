//! Product Hunt launches, optionally with an LLM sentiment review of the
//! top few.

use super::Sensor;
use crate::api::{AskAsync, LlmClient, is_error_marked};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Category, Item};
use crate::scrapers::SourceFetcher;
use crate::scrapers::producthunt::ProductHuntFeed;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const NAME: &str = "product_hunt";

pub const REVIEW_SYSTEM_PROMPT: &str =
    "You are an X (Twitter) market analyst. Answer concisely in Markdown.";

pub struct ProductHunt {
    feed: ProductHuntFeed,
    reviewer: Option<LlmClient>,
    reviews: usize,
}

impl ProductHunt {
    pub fn new(client: Client, config: Arc<Config>, reviewer: Option<LlmClient>) -> Self {
        let reviews = config.sensors.product_reviews;
        Self {
            feed: ProductHuntFeed::new(client, config),
            reviewer,
            reviews,
        }
    }

    #[instrument(level = "info", skip_all, fields(product = %item.title))]
    async fn review(&self, reviewer: &LlmClient, item: &Item) -> Option<String> {
        let prompt = format!(
            "Search X for the product \"{}\" with tagline \"{}\". Summarize market sentiment: \
             1. overall sentiment 2. three to five key findings 3. pros and cons. \
             If there is no discussion, say so.",
            item.title,
            item.tagline.as_deref().unwrap_or_default()
        );
        match reviewer.ask(&prompt).await {
            Ok(answer) if !is_error_marked(&answer) => Some(answer.trim().to_string()),
            Ok(_) => {
                warn!("Review came back error-marked; leaving it empty");
                None
            }
            Err(e) => {
                warn!(error = %e, "Review failed");
                None
            }
        }
    }
}

#[async_trait]
impl Sensor for ProductHunt {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> Category {
        Category::ProductGems
    }

    async fn collect(&self, limit: usize) -> Result<Vec<Item>> {
        let mut products: Vec<Item> = self
            .feed
            .try_fetch(limit, None)
            .await?
            .into_iter()
            .map(|item| item.with_category("Product Hunt").with_time("Today"))
            .collect();

        if let Some(reviewer) = &self.reviewer {
            for item in products.iter_mut().take(self.reviews) {
                info!(product = %item.title, "Requesting sentiment review");
                item.grok_review = self.review(reviewer, item).await;
            }
        }
        Ok(products)
    }
}
