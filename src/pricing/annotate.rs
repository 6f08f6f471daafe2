//! Session cost annotation
//!
//! Prices are resolved once per distinct model for the whole pass, so the
//! result never depends on the order lookups finish in.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::core::{SessionInventory, SessionRecord};

use super::types::{CostBreakdown, ModelPricing, PricingSource};

/// Resolve every distinct model once. Failures count as "no pricing".
fn resolve_models(
    sessions: &[SessionRecord],
    pricing: &dyn PricingSource,
) -> HashMap<String, Option<ModelPricing>> {
    let models: BTreeSet<&str> = sessions
        .iter()
        .flat_map(|s| s.models.keys().map(String::as_str))
        .collect();

    models
        .into_par_iter()
        .map(|model| {
            let resolved = match pricing.model_pricing(model) {
                Ok(Some(p)) => Some(p),
                Ok(None) => {
                    debug!(model, "no pricing for model");
                    None
                }
                Err(err) => {
                    warn!(model, error = %err, "pricing lookup failed");
                    None
                }
            };
            (model.to_string(), resolved)
        })
        .collect()
}

fn session_cost(
    session: &SessionRecord,
    prices: &HashMap<String, Option<ModelPricing>>,
    pricing: &dyn PricingSource,
) -> f64 {
    let mut models: Vec<_> = session.models.iter().collect();
    models.sort_by(|a, b| a.0.cmp(b.0));
    models
        .into_iter()
        .filter_map(|(model, usage)| {
            let price = prices.get(model).copied().flatten()?;
            Some(pricing.calculate_cost(&CostBreakdown::from_usage(usage), &price))
        })
        .sum()
}

/// Drop sessions without any usage, price the rest and sum the totals
pub(crate) fn annotate_costs(
    sessions: Vec<SessionRecord>,
    pricing: &dyn PricingSource,
) -> SessionInventory {
    let before = sessions.len();
    let mut sessions: Vec<SessionRecord> = sessions
        .into_iter()
        .filter(|s| !s.usage.is_zero())
        .collect();
    if sessions.len() < before {
        debug!(dropped = before - sessions.len(), "dropped sessions without usage");
    }

    let prices = resolve_models(&sessions, pricing);
    for session in &mut sessions {
        session.cost_usd = session_cost(session, &prices, pricing);
    }

    SessionInventory {
        total_blended_tokens: sessions
            .iter()
            .map(|s| s.blended_tokens)
            .fold(0, u64::saturating_add),
        total_cost_usd: sessions.iter().map(|s| s.cost_usd).sum(),
        sessions,
    }
}
