use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::PricingError;

pub(super) type RawPricing = HashMap<String, serde_json::Value>;

pub(super) fn default_cache_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".cache").join("ccresume").join("pricing.json"))
}

fn cache_error(path: &Path, source: std::io::Error) -> PricingError {
    PricingError::Cache {
        path: path.to_path_buf(),
        source,
    }
}

pub(super) fn load_raw_cache(path: &Path) -> Result<RawPricing, PricingError> {
    let file = File::open(path).map_err(|e| cache_error(path, e))?;
    Ok(serde_json::from_reader(file)?)
}

/// Cached data and its age, or `None` when older than `ttl`
pub(super) fn load_raw_cache_if_fresh(
    path: &Path,
    ttl: Duration,
) -> Result<Option<(RawPricing, Duration)>, PricingError> {
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| cache_error(path, e))?;
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or_default();
    if age > ttl {
        return Ok(None);
    }
    Ok(Some((load_raw_cache(path)?, age)))
}

pub(super) fn save_raw_cache(path: &Path, raw_data: &RawPricing) -> Result<(), PricingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| cache_error(parent, e))?;
    }
    let file = File::create(path).map_err(|e| cache_error(path, e))?;
    serde_json::to_writer(file, raw_data)?;
    Ok(())
}
