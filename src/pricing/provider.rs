use std::time::Duration;

use tracing::debug;

use crate::error::PricingError;

use super::cache::RawPricing;

const LITELLM_PRICING_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_RETRIES: usize = 3;
const RETRY_BACKOFF_MS: u64 = 250;

fn fetch_once(agent: &ureq::Agent) -> Result<RawPricing, PricingError> {
    let response = agent
        .get(LITELLM_PRICING_URL)
        .call()
        .map_err(|e| PricingError::Fetch {
            message: e.to_string(),
        })?;
    let mut body = response.into_body();
    Ok(serde_json::from_reader(body.as_reader())?)
}

/// Download the LiteLLM price table, retrying with linear back-off
pub(super) fn fetch_litellm_raw() -> Result<RawPricing, PricingError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(FETCH_TIMEOUT))
        .build()
        .into();

    let mut last_error = None;
    for attempt in 0..FETCH_RETRIES {
        match fetch_once(&agent) {
            Ok(data) => return Ok(data),
            Err(err) => {
                debug!(attempt = attempt + 1, error = %err, "pricing fetch failed");
                last_error = Some(err);
            }
        }

        if attempt + 1 < FETCH_RETRIES {
            std::thread::sleep(Duration::from_millis(
                RETRY_BACKOFF_MS * (attempt as u64 + 1),
            ));
        }
    }

    Err(last_error.unwrap_or_else(|| PricingError::Fetch {
        message: "no attempts made".to_string(),
    }))
}
