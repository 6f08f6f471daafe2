use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::PricingError;

use super::cache::{
    RawPricing, default_cache_path, load_raw_cache, load_raw_cache_if_fresh, save_raw_cache,
};
use super::provider::fetch_litellm_raw;
use super::resolver::{fallback_pricing, parse_litellm_data, resolve_pricing_known};
use super::types::{ModelPricing, PricingSource};

const PRICING_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Pricing database loaded from LiteLLM or cache
#[derive(Debug, Default)]
pub(crate) struct PricingDb {
    models: HashMap<String, ModelPricing>,
}

impl PricingDb {
    fn from_raw_data(data: RawPricing) -> Self {
        Self {
            models: parse_litellm_data(data),
        }
    }

    pub(crate) fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Load prices from the default cache location, fetching when allowed
    pub(crate) fn load(offline: bool) -> Self {
        Self::load_with_cache(default_cache_path().as_deref(), offline)
    }

    /// Offline: cache or built-in fallbacks only. Online: a fresh cache,
    /// else the network, else a stale cache, else built-in fallbacks.
    pub(crate) fn load_with_cache(cache_path: Option<&Path>, offline: bool) -> Self {
        let start = Instant::now();
        let elapsed = || start.elapsed().as_secs_f64() * 1000.0;

        if !offline {
            if let Some(path) = cache_path {
                match load_raw_cache_if_fresh(path, PRICING_CACHE_TTL) {
                    Ok(Some((raw, age))) => {
                        let db = Self::from_raw_data(raw);
                        debug!(
                            models = db.model_count(),
                            age_hours = age.as_secs_f64() / 3600.0,
                            "using cached pricing"
                        );
                        return db;
                    }
                    Ok(None) => debug!("pricing cache is stale"),
                    Err(err) => debug!(error = %err, "no usable pricing cache"),
                }
            }

            match fetch_litellm_raw() {
                Ok(raw) => {
                    if let Some(path) = cache_path
                        && let Err(err) = save_raw_cache(path, &raw)
                    {
                        warn!(error = %err, "failed to save pricing cache");
                    }
                    let db = Self::from_raw_data(raw);
                    debug!(
                        models = db.model_count(),
                        elapsed_ms = elapsed(),
                        "fetched pricing from LiteLLM"
                    );
                    return db;
                }
                Err(err) => warn!(error = %err, "pricing fetch failed, trying cache"),
            }
        }

        if let Some(db) = cache_path.and_then(Self::load_cached) {
            debug!(
                models = db.model_count(),
                elapsed_ms = elapsed(),
                "using cached pricing"
            );
            return db;
        }

        debug!("no pricing data, using built-in defaults");
        Self::default()
    }

    fn load_cached(path: &Path) -> Option<Self> {
        match load_raw_cache(path) {
            Ok(raw) => Some(Self::from_raw_data(raw)),
            Err(err) => {
                debug!(error = %err, "no usable pricing cache");
                None
            }
        }
    }
}

impl PricingSource for PricingDb {
    fn model_pricing(&self, model: &str) -> Result<Option<ModelPricing>, PricingError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(PricingError::InvalidModel {
                model: model.to_string(),
            });
        }
        Ok(resolve_pricing_known(model, &self.models).or_else(|| fallback_pricing(model)))
    }
}
