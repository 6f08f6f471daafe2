//! Token usage normalization and accumulation
//!
//! Both sources report usage with different field sets. Anthropic-style
//! payloads report cache reads and writes *next to* `input_tokens`, while
//! OpenAI-style payloads report `cached_input_tokens` as a share of
//! `input_tokens`. Both are folded into one [`TokenUsage`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

use crate::core::types::{SessionRecord, TokenUsage};

/// Usage payload as found in either log format. Every field is optional and
/// tolerant of strings, floats, negatives and nulls.
#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct RawUsage {
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) cached_input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) cache_read_input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) cache_creation_input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) reasoning_output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) total_tokens: Option<u64>,
}

fn count_from_value(value: &Value) -> Option<u64> {
    let as_float = |f: f64| f.is_finite().then(|| f.max(0.0) as u64);
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().and_then(as_float)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(as_float),
        _ => None,
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

impl RawUsage {
    pub(crate) fn normalize(&self) -> TokenUsage {
        let cache_write = self.cache_creation_input_tokens.unwrap_or(0);
        let additive_cache_read = self.cache_read_input_tokens.unwrap_or(0);
        let input = self
            .input_tokens
            .unwrap_or(0)
            .saturating_add(cache_write)
            .saturating_add(additive_cache_read);
        let cached = self
            .cached_input_tokens
            .unwrap_or(0)
            .saturating_add(additive_cache_read);
        let output = self.output_tokens.unwrap_or(0);
        let total = match self.total_tokens {
            Some(total) if total > 0 => total,
            _ => input.saturating_add(output),
        };

        TokenUsage {
            input_tokens: input,
            cached_input_tokens: cached,
            output_tokens: output,
            reasoning_output_tokens: self.reasoning_output_tokens.unwrap_or(0),
            total_tokens: total,
            cache_write_tokens: cache_write,
        }
    }
}

/// Session-level and per-model usage accumulator
#[derive(Debug, Default)]
pub(crate) struct UsageAccumulator {
    total: TokenUsage,
    models: HashMap<String, TokenUsage>,
    /// Models in first-seen order, for tie-breaking
    model_order: Vec<String>,
}

impl UsageAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, model: &str, usage: &TokenUsage) {
        self.total.add(usage);
        match self.models.get_mut(model) {
            Some(existing) => existing.add(usage),
            None => {
                self.models.insert(model.to_string(), *usage);
                self.model_order.push(model.to_string());
            }
        }
    }

    /// Model with the highest token count. A later model has to be strictly
    /// greater to replace the leader, so ties go to the first one seen.
    pub(crate) fn primary_model(&self) -> Option<&str> {
        let mut leader: Option<(&str, u64)> = None;
        for model in &self.model_order {
            let tokens = self.models.get(model).map_or(0, TokenUsage::ranking_tokens);
            match leader {
                Some((_, best)) if tokens <= best => {}
                _ => leader = Some((model.as_str(), tokens)),
            }
        }
        leader.map(|(model, _)| model)
    }

    pub(crate) fn into_parts(self) -> (TokenUsage, HashMap<String, TokenUsage>, Option<String>) {
        let primary = self.primary_model().map(str::to_string);
        (self.total, self.models, primary)
    }

    /// Move the accumulated usage into a session record
    pub(crate) fn apply_to(self, session: &mut SessionRecord) {
        let (total, models, primary) = self.into_parts();
        session.blended_tokens = total.blended_tokens();
        session.usage = total;
        session.models = models;
        session.primary_model = primary;
    }
}
