//! Fan-out collection of every source into one [`IntelligenceBundle`].
//!
//! Two nested bounded groups run on the tokio runtime:
//!
//! ```text
//! sensor group (collector.sensor_workers)
//! ├── external batch (collector.external_workers)
//! │   ├── Hacker News   -> tech_trends
//! │   ├── GitHub        -> tech_trends
//! │   ├── 36Kr          -> capital_flow
//! │   ├── WallStreetCN  -> capital_flow
//! │   └── V2EX          -> community
//! ├── product_hunt      -> product_gems
//! ├── arxiv             -> research
//! ├── social            -> social
//! ├── xhs               -> xhs_directives
//! └── hn_blogs          -> insights
//! ```
//!
//! Every unit of work is a spawned task, so a panic is contained at the task
//! boundary and becomes a warning plus an empty contribution. Results are
//! folded in completion order.

use crate::config::Config;
use crate::dedup::dedup_items;
use crate::error::FetchError;
use crate::models::{Category, IntelligenceBundle, Item};
use crate::scrapers::{SourceFetcher, github, hackernews, kr36, v2ex, wallstreetcn};
use crate::sensors::{Capabilities, Sensor, build_sensors};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// A scraping source and where its items land.
#[derive(Clone)]
pub struct ExternalSource {
    pub fetcher: Arc<dyn SourceFetcher>,
    pub category: Category,
    /// Written into each item's `category` field.
    pub label: &'static str,
}

/// Result of one task in either group.
#[derive(Debug)]
enum Outcome {
    Collected(Vec<(Category, Vec<Item>)>),
    Failed { task: String, reason: String },
}

pub struct Collector {
    external: Vec<ExternalSource>,
    sensors: Vec<Arc<dyn Sensor>>,
    external_workers: usize,
    sensor_workers: usize,
}

impl Collector {
    /// Wire up the standard sources and every sensor the configuration allows.
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        let caps = Capabilities::probe(&config);
        let sensors = build_sensors(&client, &config, &caps);
        let external = vec![
            ExternalSource {
                fetcher: Arc::new(hackernews::HackerNews::new(client.clone(), Arc::clone(&config))),
                category: Category::TechTrends,
                label: "Hacker News",
            },
            ExternalSource {
                fetcher: Arc::new(github::GithubTrending::new(client.clone(), Arc::clone(&config))),
                category: Category::TechTrends,
                label: "GitHub",
            },
            ExternalSource {
                fetcher: Arc::new(kr36::Kr36::new(client.clone(), Arc::clone(&config))),
                category: Category::CapitalFlow,
                label: "36Kr",
            },
            ExternalSource {
                fetcher: Arc::new(wallstreetcn::WallStreetCn::new(client.clone(), Arc::clone(&config))),
                category: Category::CapitalFlow,
                label: "WallStreetCN",
            },
            ExternalSource {
                fetcher: Arc::new(v2ex::V2ex::new(client, Arc::clone(&config))),
                category: Category::Community,
                label: "V2EX",
            },
        ];
        Self::from_parts(config.as_ref(), external, sensors)
    }

    pub fn from_parts(
        config: &Config,
        external: Vec<ExternalSource>,
        sensors: Vec<Arc<dyn Sensor>>,
    ) -> Self {
        Self {
            external,
            sensors,
            external_workers: config.collector.external_workers.max(1),
            sensor_workers: config.collector.sensor_workers.max(1),
        }
    }

    /// Collect everything. Never fails; a total outage yields an empty bundle.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_all_sources(&self, limit: usize) -> IntelligenceBundle {
        let t0 = Instant::now();
        info!(
            limit,
            external = self.external.len(),
            sensors = self.sensors.len(),
            "Starting fetch from all sources"
        );

        let mut tasks: Vec<BoxFuture<'static, Outcome>> = Vec::with_capacity(self.sensors.len() + 1);
        tasks.push(run_external_batch(self.external.clone(), self.external_workers, limit).boxed());
        for sensor in &self.sensors {
            tasks.push(run_sensor(Arc::clone(sensor), limit).boxed());
        }

        let outcomes: Vec<Outcome> = stream::iter(tasks)
            .buffer_unordered(self.sensor_workers)
            .collect()
            .await;

        let bundle = fold_outcomes(outcomes);
        info!(
            total = bundle.total(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetch complete"
        );
        bundle
    }
}

fn from_join<T>(
    task: String,
    joined: std::result::Result<T, tokio::task::JoinError>,
    ok: impl FnOnce(T) -> Outcome,
) -> Outcome {
    match joined {
        Ok(value) => ok(value),
        Err(e) => Outcome::Failed {
            task,
            reason: FetchError::from(e).to_string(),
        },
    }
}

/// The five scraping sources as one task of the sensor group.
///
/// Nothing is spawned before the first poll, so the sensor group bound
/// also caps this task.
async fn run_external_batch(sources: Vec<ExternalSource>, workers: usize, limit: usize) -> Outcome {
    let handle = tokio::spawn(async move {
        let per_source: Vec<Outcome> = stream::iter(sources)
            .map(|source| {
                let handle = tokio::spawn({
                    let fetcher = Arc::clone(&source.fetcher);
                    async move { fetcher.fetch(limit, None).await }
                });
                async move {
                    from_join(source.label.to_string(), handle.await, |items| {
                        info!(source = source.label, count = items.len(), "Source done");
                        let tagged = items
                            .into_iter()
                            .map(|item| item.with_category(source.label))
                            .collect();
                        Outcome::Collected(vec![(source.category, tagged)])
                    })
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        let mut merged = Vec::new();
        for outcome in per_source {
            match outcome {
                Outcome::Collected(parts) => merged.extend(parts),
                failed @ Outcome::Failed { .. } => log_failure(&failed),
            }
        }
        merged
    });
    from_join("external batch".to_string(), handle.await, Outcome::Collected)
}

async fn run_sensor(sensor: Arc<dyn Sensor>, limit: usize) -> Outcome {
    let name = sensor.name();
    let category = sensor.category();
    let handle = tokio::spawn(async move {
        let limit = sensor.effective_limit(limit);
        sensor.collect(limit).await
    });
    from_join(name.to_string(), handle.await, |result| match result {
        Ok(items) => {
            info!(sensor = name, count = items.len(), "Sensor done");
            Outcome::Collected(vec![(category, items)])
        }
        Err(e) => Outcome::Failed {
            task: name.to_string(),
            reason: e.to_string(),
        },
    })
}

fn log_failure(outcome: &Outcome) {
    if let Outcome::Failed { task, reason } = outcome {
        warn!(task = %task, reason = %reason, "Task failed; contributing no items");
    }
}

/// Merge task results, then deduplicate the scraped categories.
fn fold_outcomes(outcomes: Vec<Outcome>) -> IntelligenceBundle {
    let mut bundle = IntelligenceBundle::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Collected(parts) => {
                for (category, items) in parts {
                    bundle.get_mut(category).extend(items);
                }
            }
            failed @ Outcome::Failed { .. } => log_failure(&failed),
        }
    }

    for category in Category::ALL.into_iter().filter(|c| c.is_deduplicated()) {
        let items = std::mem::take(bundle.get_mut(category));
        *bundle.get_mut(category) = dedup_items(items);
    }
    bundle
}
