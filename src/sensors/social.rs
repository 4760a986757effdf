//! X/Twitter trend digest written by Grok.
//!
//! The model returns a single Markdown block. It is kept verbatim, apart
//! from the link-validation pass which flags citations that do not resolve.

use super::Sensor;
use crate::api::{AskAsync, LlmClient, is_error_marked};
use crate::error::Result;
use crate::models::{Category, Item, ItemKind};
use crate::verifier::LinkVerifier;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

pub const NAME: &str = "social";

pub const SYSTEM_PROMPT: &str = "You are a technology intelligence analyst with live access to X. \
Write in Markdown and cite every post you mention as a Markdown link.";

pub struct Social {
    llm: LlmClient,
    verifier: Option<LinkVerifier>,
    topic: String,
}

impl Social {
    pub fn new(llm: LlmClient, verifier: Option<LinkVerifier>, topic: String) -> Self {
        Self {
            llm,
            verifier,
            topic,
        }
    }

    fn prompt(&self) -> String {
        format!(
            "Report the most discussed X posts of the last 24 hours about: {}. \
             Group them into short themed sections with one line per post.",
            self.topic
        )
    }
}

#[async_trait]
impl Sensor for Social {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> Category {
        Category::Social
    }

    #[instrument(level = "info", skip(self), fields(topic = %self.topic))]
    async fn collect(&self, _limit: usize) -> Result<Vec<Item>> {
        let answer = self.llm.ask(&self.prompt()).await?;
        if is_error_marked(&answer) {
            warn!("Social search answered with an error; no data");
            return Ok(Vec::new());
        }

        let report = match &self.verifier {
            Some(verifier) => verifier.validate_links(&answer).await,
            None => answer,
        };
        info!(chars = report.chars().count(), "Social report received");

        let mut item = Item::new("X (via Grok)", "").with_category("X/Grok");
        item.content = Some(report);
        item.kind = ItemKind::MarkdownReport;
        Ok(vec![item])
    }
}
