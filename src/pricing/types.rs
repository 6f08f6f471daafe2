use crate::core::TokenUsage;
use crate::error::PricingError;

/// Model pricing info (per token, not per million)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ModelPricing {
    pub(crate) input: f64,
    pub(crate) output: f64,
    pub(crate) cache_create: f64,
    pub(crate) cache_read: f64,
}

/// Token counts priced independently of each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CostBreakdown {
    pub(crate) non_cached_input: u64,
    pub(crate) output: u64,
    pub(crate) cache_write: u64,
    pub(crate) cache_read: u64,
}

impl CostBreakdown {
    /// Split canonical usage; cache reads and writes are carved out of input
    pub(crate) fn from_usage(usage: &TokenUsage) -> Self {
        CostBreakdown {
            non_cached_input: usage
                .input_tokens
                .saturating_sub(usage.cached_input_tokens)
                .saturating_sub(usage.cache_write_tokens),
            output: usage.output_tokens,
            cache_write: usage.cache_write_tokens,
            cache_read: usage.cached_input_tokens,
        }
    }
}

/// Price table lookup consumed by the cost annotator
pub(crate) trait PricingSource: Sync {
    /// Pricing for `model`, or `None` when the model is unknown
    fn model_pricing(&self, model: &str) -> Result<Option<ModelPricing>, PricingError>;

    fn calculate_cost(&self, breakdown: &CostBreakdown, pricing: &ModelPricing) -> f64 {
        breakdown.non_cached_input as f64 * pricing.input
            + breakdown.output as f64 * pricing.output
            + breakdown.cache_write as f64 * pricing.cache_create
            + breakdown.cache_read as f64 * pricing.cache_read
    }
}

/// Price source used with `--no-cost`: every model is unpriced
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoPricing;

impl PricingSource for NoPricing {
    fn model_pricing(&self, _model: &str) -> Result<Option<ModelPricing>, PricingError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_separates_cache_shares() {
        let usage = TokenUsage {
            input_tokens: 350,
            cached_input_tokens: 200,
            output_tokens: 30,
            reasoning_output_tokens: 0,
            total_tokens: 380,
            cache_write_tokens: 50,
        };
        let b = CostBreakdown::from_usage(&usage);
        assert_eq!(b.non_cached_input, 100);
        assert_eq!(b.cache_read, 200);
        assert_eq!(b.cache_write, 50);
        assert_eq!(b.output, 30);
    }

    #[test]
    fn default_cost_formula() {
        let breakdown = CostBreakdown {
            non_cached_input: 1000,
            output: 500,
            ..Default::default()
        };
        let pricing = ModelPricing {
            input: 1e-6,
            output: 2e-6,
            ..Default::default()
        };
        let cost = NoPricing.calculate_cost(&breakdown, &pricing);
        assert!((cost - 0.002).abs() < 1e-9);
    }
}
