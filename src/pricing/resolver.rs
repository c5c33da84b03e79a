use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::HashMap;
use std::sync::PoisonError;

use crate::consts::TIER_THRESHOLD_TOKENS;

use super::types::{ModelPricing, PriceTable, TokenUsage};

/// Prefixes tried, in order, after an exact-name miss
const MODEL_PREFIXES: [&str; 5] = [
    "anthropic/",
    "claude-3-5-",
    "claude-3-",
    "claude-",
    "openrouter/openai/",
];

/// Build a table from the decoded LiteLLM document. Null and malformed
/// records are dropped.
pub(super) fn parse_price_table(data: HashMap<String, serde_json::Value>) -> PriceTable {
    let models = data
        .into_iter()
        .filter(|(_, value)| value.is_object())
        .filter_map(|(name, value)| {
            serde_json::from_value::<ModelPricing>(value)
                .ok()
                .map(|pricing| (name, pricing))
        })
        .collect();
    PriceTable::new(models)
}

/// Look up pricing for `model`, memoizing the matched key on the table
pub(super) fn resolve_pricing<'a>(table: &'a PriceTable, model: &str) -> Option<&'a ModelPricing> {
    let cached = table
        .resolved
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(model)
        .cloned();

    let key = match cached {
        Some(key) => key,
        None => {
            let key = resolve_key(&table.models, model);
            table
                .resolved
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(model.to_string(), key.clone());
            key
        }
    };

    key.and_then(|key| table.models.get(&key))
}

fn resolve_key(models: &HashMap<String, ModelPricing>, model: &str) -> Option<String> {
    if models.contains_key(model) {
        return Some(model.to_string());
    }

    for prefix in MODEL_PREFIXES {
        let candidate = format!("{prefix}{model}");
        if models.contains_key(&candidate) {
            return Some(candidate);
        }
    }

    // Partial match either way, longest key first for a stable pick
    let model_lower = model.to_lowercase();
    let mut candidates: Vec<&String> = models
        .keys()
        .filter(|name| {
            let name_lower = name.to_lowercase();
            name_lower.contains(&model_lower) || model_lower.contains(&name_lower)
        })
        .collect();
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    candidates.first().map(|name| (*name).clone())
}

pub(super) fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> Decimal {
    [
        tiered_cost(usage.input_tokens, pricing.input, pricing.input_above_200k),
        tiered_cost(usage.output_tokens, pricing.output, pricing.output_above_200k),
        tiered_cost(
            usage.cache_creation_tokens,
            pricing.cache_create,
            pricing.cache_create_above_200k,
        ),
        tiered_cost(
            usage.cache_read_tokens,
            pricing.cache_read,
            pricing.cache_read_above_200k,
        ),
    ]
    .into_iter()
    .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Saturates at `Decimal::MAX` for absurd rates or token counts
fn tiered_cost(tokens: u64, base: Option<f64>, above: Option<f64>) -> Decimal {
    if tokens == 0 {
        return Decimal::ZERO;
    }
    let base = base.and_then(Decimal::from_f64);
    let above = above.and_then(Decimal::from_f64);
    let priced = |tokens: u64, rate: Option<Decimal>| {
        rate.map(|rate| Decimal::from(tokens).saturating_mul(rate))
            .unwrap_or(Decimal::ZERO)
    };

    if above.is_some() && tokens > TIER_THRESHOLD_TOKENS {
        let over = priced(tokens - TIER_THRESHOLD_TOKENS, above);
        over.saturating_add(priced(TIER_THRESHOLD_TOKENS, base))
    } else {
        priced(tokens, base)
    }
}
