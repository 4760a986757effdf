//! JSON dump of the collected bundle.
//!
//! The file is a single object with all eight category keys, pretty-printed
//! so it can be diffed between runs.

use crate::models::IntelligenceBundle;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `bundle` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_bundle(bundle: &IntelligenceBundle, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(bundle)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(items = bundle.total(), "Wrote bundle JSON");
    Ok(())
}
