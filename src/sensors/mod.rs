//! Optional enrichment sensors.
//!
//! A sensor is like a [`SourceFetcher`](crate::scrapers::SourceFetcher) that
//! fills one whole bundle category and may be switched off for a run.
//! Availability is decided once, up front, by [`Capabilities::probe`]; an
//! unavailable sensor is registered as [`Disabled`] so the collector never
//! has to special-case it.
//!
//! | Sensor | Module | Category | Needs |
//! |--------|--------|----------|-------|
//! | `product_hunt` | [`product_hunt`] | `product_gems` | LLM only for reviews |
//! | `arxiv` | [`arxiv`] | `research` | |
//! | `social` | [`social`] | `social` | LLM credentials |
//! | `xhs` | [`xhs`] | `xhs_directives` | |
//! | `hn_blogs` | [`hn_blogs`] | `insights` | |

pub mod arxiv;
pub mod hn_blogs;
pub mod product_hunt;
pub mod social;
pub mod xhs;

use crate::api::llm_client;
use crate::config::Config;
use crate::error::Result;
use crate::models::{Category, Item};
use crate::verifier::LinkVerifier;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait Sensor: Send + Sync {
    /// Configuration name, as used in `sensors.disabled`.
    fn name(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Limit actually used for a run-level `requested` limit.
    fn effective_limit(&self, requested: usize) -> usize {
        requested
    }

    async fn collect(&self, limit: usize) -> Result<Vec<Item>>;
}

/// Stand-in for a sensor that is unavailable this run.
pub struct Disabled {
    name: &'static str,
    category: Category,
}

impl Disabled {
    pub fn new(name: &'static str, category: Category) -> Self {
        Self { name, category }
    }
}

#[async_trait]
impl Sensor for Disabled {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn collect(&self, _limit: usize) -> Result<Vec<Item>> {
        Ok(Vec::new())
    }
}

/// What this run is able to do, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub product_hunt: bool,
    pub arxiv: bool,
    pub social: bool,
    pub xhs: bool,
    pub hn_blogs: bool,
    /// LLM credentials are present.
    pub llm: bool,
    pub link_verifier: bool,
}

impl Capabilities {
    pub fn probe(config: &Config) -> Self {
        let enabled = |name: &str| !config.sensors.is_disabled(name);
        let llm = config.llm.has_credentials();
        let caps = Self {
            product_hunt: enabled(product_hunt::NAME),
            arxiv: enabled(arxiv::NAME),
            social: enabled(social::NAME) && llm,
            xhs: enabled(xhs::NAME),
            hn_blogs: enabled(hn_blogs::NAME),
            llm,
            link_verifier: config.verifier.enabled,
        };

        for (name, on) in [
            (product_hunt::NAME, caps.product_hunt),
            (arxiv::NAME, caps.arxiv),
            (social::NAME, caps.social),
            (xhs::NAME, caps.xhs),
            (hn_blogs::NAME, caps.hn_blogs),
        ] {
            if !on {
                info!(sensor = name, "Sensor unavailable; it will contribute nothing");
            }
        }
        if !llm {
            info!("No LLM API key configured; social search and product reviews are off");
        }
        caps
    }
}

/// One sensor per optional category, real or [`Disabled`].
pub fn build_sensors(
    client: &Client,
    config: &Arc<Config>,
    caps: &Capabilities,
) -> Vec<Arc<dyn Sensor>> {
    let product_hunt_sensor: Arc<dyn Sensor> = if caps.product_hunt {
        let reviewer = if caps.llm {
            llm_client(client.clone(), &config.llm, product_hunt::REVIEW_SYSTEM_PROMPT)
        } else {
            None
        };
        Arc::new(product_hunt::ProductHunt::new(
            client.clone(),
            Arc::clone(config),
            reviewer,
        ))
    } else {
        Arc::new(Disabled::new(product_hunt::NAME, Category::ProductGems))
    };

    let arxiv_sensor: Arc<dyn Sensor> = if caps.arxiv {
        Arc::new(arxiv::Arxiv::new(client.clone(), Arc::clone(config)))
    } else {
        Arc::new(Disabled::new(arxiv::NAME, Category::Research))
    };

    let social_llm = if caps.social {
        llm_client(client.clone(), &config.llm, social::SYSTEM_PROMPT)
    } else {
        None
    };
    let social_sensor: Arc<dyn Sensor> = match social_llm {
        Some(llm) => {
            let verifier = caps
                .link_verifier
                .then(|| LinkVerifier::new(client.clone(), &config.verifier));
            Arc::new(social::Social::new(
                llm,
                verifier,
                config.sensors.social_topic.clone(),
            ))
        }
        None => Arc::new(Disabled::new(social::NAME, Category::Social)),
    };

    let xhs_sensor: Arc<dyn Sensor> = if caps.xhs {
        Arc::new(xhs::XhsRadar::new(Arc::clone(config)))
    } else {
        Arc::new(Disabled::new(xhs::NAME, Category::XhsDirectives))
    };

    let hn_blogs_sensor: Arc<dyn Sensor> = if caps.hn_blogs {
        Arc::new(hn_blogs::HnBlogs::new(client.clone(), Arc::clone(config)))
    } else {
        Arc::new(Disabled::new(hn_blogs::NAME, Category::Insights))
    };

    vec![
        product_hunt_sensor,
        arxiv_sensor,
        social_sensor,
        xhs_sensor,
        hn_blogs_sensor,
    ]
}
