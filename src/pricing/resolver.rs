use std::collections::HashMap;

use super::cache::RawPricing;
use super::types::ModelPricing;

fn is_openai_model(name: &str) -> bool {
    let bare = name.strip_prefix("openai/").unwrap_or(name);
    let o_series = bare.len() > 1
        && bare.starts_with('o')
        && bare.as_bytes()[1].is_ascii_digit();
    name.starts_with("openai/") || bare.starts_with("gpt-") || bare.contains("codex") || o_series
}

fn cost_field(value: &serde_json::Value, key: &str) -> f64 {
    value.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

/// Keep Claude and OpenAI entries of the LiteLLM table
pub(super) fn parse_litellm_data(data: RawPricing) -> HashMap<String, ModelPricing> {
    let mut models = HashMap::new();

    for (name, value) in data {
        let is_claude = name.contains("claude");
        if !is_claude && !is_openai_model(&name) {
            continue;
        }

        let pricing = ModelPricing {
            input: cost_field(&value, "input_cost_per_token"),
            output: cost_field(&value, "output_cost_per_token"),
            cache_create: cost_field(&value, "cache_creation_input_token_cost"),
            cache_read: cost_field(&value, "cache_read_input_token_cost"),
        };

        if let Some(stripped) = name.strip_prefix("openai/") {
            models.entry(stripped.to_string()).or_insert(pricing);
        }
        models.insert(name, pricing);
    }

    models
}

/// Exact name, then `claude-` prefixed, then the longest partial match
pub(super) fn resolve_pricing_known(
    model: &str,
    models: &HashMap<String, ModelPricing>,
) -> Option<ModelPricing> {
    if let Some(pricing) = models.get(model) {
        return Some(*pricing);
    }

    if let Some(pricing) = models.get(&format!("claude-{model}")) {
        return Some(*pricing);
    }

    let model_lower = model.to_lowercase();
    let mut candidates: Vec<(&String, &ModelPricing)> = models
        .iter()
        .filter(|(name, _)| {
            let name_lower = name.to_lowercase();
            name_lower.contains(&model_lower) || model_lower.contains(&name_lower)
        })
        .collect();
    candidates.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    candidates.first().map(|(_, pricing)| **pricing)
}

/// Built-in prices for known model families, `None` for anything else
pub(super) fn fallback_pricing(model: &str) -> Option<ModelPricing> {
    let model_lower = model.to_lowercase();
    let pricing = if model_lower.contains("opus-4-5") || model_lower.contains("opus-4.5") {
        ModelPricing {
            input: 5e-6,   // $5/M
            output: 25e-6, // $25/M
            cache_create: 6.25e-6,
            cache_read: 0.5e-6,
        }
    } else if model_lower.contains("opus") {
        ModelPricing {
            input: 15e-6,
            output: 75e-6,
            cache_create: 18.75e-6,
            cache_read: 1.5e-6,
        }
    } else if model_lower.contains("sonnet") {
        ModelPricing {
            input: 3e-6,
            output: 15e-6,
            cache_create: 3.75e-6,
            cache_read: 0.3e-6,
        }
    } else if model_lower.contains("haiku") {
        ModelPricing {
            input: 0.8e-6,
            output: 4e-6,
            cache_create: 1e-6,
            cache_read: 0.08e-6,
        }
    } else if model_lower.contains("gpt-5") || model_lower.contains("codex") {
        ModelPricing {
            input: 1.25e-6, // $1.25/M
            output: 10e-6,  // $10/M
            cache_create: 0.0,
            cache_read: 0.125e-6,
        }
    } else if model_lower.contains("gpt-4") {
        ModelPricing {
            input: 2.5e-6,
            output: 10e-6,
            cache_create: 0.0,
            cache_read: 0.0,
        }
    } else {
        return None;
    };
    Some(pricing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> HashMap<String, ModelPricing> {
        let mut raw = RawPricing::new();
        raw.insert(
            "claude-sonnet-4-20250514".into(),
            json!({"input_cost_per_token": 3e-6, "output_cost_per_token": 15e-6,
                   "cache_creation_input_token_cost": 3.75e-6, "cache_read_input_token_cost": 3e-7}),
        );
        raw.insert(
            "openai/gpt-5".into(),
            json!({"input_cost_per_token": 1.25e-6, "output_cost_per_token": 1e-5}),
        );
        raw.insert("o3".into(), json!({"input_cost_per_token": 2e-6}));
        raw.insert("gemini-2.5-pro".into(), json!({"input_cost_per_token": 1e-6}));
        parse_litellm_data(raw)
    }

    #[test]
    fn parse_keeps_claude_and_openai_models() {
        let models = sample();
        assert!(models.contains_key("claude-sonnet-4-20250514"));
        assert!(models.contains_key("openai/gpt-5"));
        assert!(models.contains_key("gpt-5"));
        assert!(models.contains_key("o3"));
        assert!(!models.contains_key("gemini-2.5-pro"));
        assert_eq!(models["claude-sonnet-4-20250514"].cache_create, 3.75e-6);
    }

    #[test]
    fn resolve_exact_prefixed_and_partial() {
        let models = sample();
        assert_eq!(resolve_pricing_known("gpt-5", &models).unwrap().input, 1.25e-6);
        assert_eq!(
            resolve_pricing_known("sonnet-4-20250514", &models).unwrap().output,
            15e-6
        );
        // "gpt-5-codex" contains "gpt-5"
        assert_eq!(resolve_pricing_known("gpt-5-codex", &models).unwrap().input, 1.25e-6);
        assert!(resolve_pricing_known("mistral-large", &models).is_none());
    }

    #[test]
    fn fallback_covers_known_families_only() {
        assert_eq!(fallback_pricing("claude-opus-4-5-20251101").unwrap().input, 5e-6);
        assert_eq!(fallback_pricing("claude-3-opus").unwrap().input, 15e-6);
        assert_eq!(fallback_pricing("gpt-5-codex").unwrap().output, 10e-6);
        assert!(fallback_pricing("unknown").is_none());
    }
}
