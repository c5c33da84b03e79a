use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::path::PathBuf;
use std::time::Duration;

use super::cache::PriceCache;
use super::provider::{FileFetcher, HttpFetcher};
use super::resolver::{calculate_cost, resolve_pricing};
use super::types::{PriceTable, TokenUsage};

/// Prices one request. Never fails: anything unpriceable costs zero.
pub(crate) trait CostSource: Send + Sync {
    fn cost(&self, usage: &TokenUsage, model: Option<&str>, override_cost_usd: Option<f64>)
    -> Decimal;
}

/// Where the resolver gets its price table
#[derive(Debug, Clone, Default)]
pub(crate) enum PricingMode {
    /// Download from LiteLLM, or from a custom URL
    #[default]
    Remote,
    RemoteUrl(String),
    File(PathBuf),
    /// No table; only explicit per-request costs count
    Offline,
}

/// Pricing database backed by a lazily loaded price table
pub(crate) struct PricingResolver {
    cache: PriceCache,
}

impl PricingResolver {
    pub(crate) fn new(mode: PricingMode, max_age: Option<Duration>) -> Self {
        let cache = match mode {
            PricingMode::Remote => PriceCache::new(Box::new(HttpFetcher::new(None)), max_age),
            PricingMode::RemoteUrl(url) => {
                PriceCache::new(Box::new(HttpFetcher::new(Some(url))), max_age)
            }
            PricingMode::File(path) => PriceCache::new(Box::new(FileFetcher::new(path)), max_age),
            PricingMode::Offline => PriceCache::preloaded(PriceTable::default()),
        };
        PricingResolver { cache }
    }

    #[cfg(test)]
    pub(crate) fn with_table(table: PriceTable) -> Self {
        PricingResolver {
            cache: PriceCache::preloaded(table),
        }
    }
}

impl CostSource for PricingResolver {
    fn cost(
        &self,
        usage: &TokenUsage,
        model: Option<&str>,
        override_cost_usd: Option<f64>,
    ) -> Decimal {
        if let Some(cost) = override_cost_usd.and_then(override_decimal) {
            return cost;
        }

        let Some(model) = model else {
            return Decimal::ZERO;
        };
        let Some(table) = self.cache.table() else {
            return Decimal::ZERO;
        };

        match resolve_pricing(&table, model) {
            Some(pricing) => calculate_cost(usage, pricing),
            None => {
                tracing::debug!(model, "no pricing found for model");
                Decimal::ZERO
            }
        }
    }
}

fn override_decimal(cost: f64) -> Option<Decimal> {
    if !cost.is_finite() || cost < 0.0 {
        tracing::debug!(cost, "ignoring invalid per-request cost");
        return None;
    }
    Decimal::from_f64(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::types::ModelPricing;
    use std::collections::HashMap;

    fn sonnet_resolver() -> PricingResolver {
        let mut models = HashMap::new();
        models.insert(
            "claude-sonnet-4".to_string(),
            ModelPricing {
                input: Some(3e-6),
                output: Some(15e-6),
                cache_create: Some(3.75e-6),
                cache_read: Some(0.3e-6),
                ..ModelPricing::default()
            },
        );
        PricingResolver::with_table(PriceTable::new(models))
    }

    fn usage(input: u64, output: u64) -> TokenUsage {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
            ..TokenUsage::default()
        }
    }

    #[test]
    fn override_cost_returned_verbatim() {
        let resolver = sonnet_resolver();
        let cost = resolver.cost(&usage(1_000_000, 0), Some("claude-sonnet-4"), Some(0.0123));
        assert_eq!(cost, Decimal::new(123, 4));
    }

    #[test]
    fn override_without_model_still_counts() {
        let resolver = PricingResolver::new(PricingMode::Offline, None);
        assert_eq!(
            resolver.cost(&usage(10, 10), None, Some(1.5)),
            Decimal::new(15, 1)
        );
    }

    #[test]
    fn negative_or_nan_override_falls_back_to_table() {
        let resolver = sonnet_resolver();
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let cost = resolver.cost(&usage(1_000_000, 0), Some("claude-sonnet-4"), Some(bad));
            assert_eq!(cost, Decimal::new(3, 0), "{bad}");
        }
    }

    #[test]
    fn missing_model_costs_zero() {
        let resolver = sonnet_resolver();
        assert_eq!(resolver.cost(&usage(1000, 1000), None, None), Decimal::ZERO);
    }

    #[test]
    fn unknown_model_costs_zero() {
        let resolver = sonnet_resolver();
        assert_eq!(
            resolver.cost(&usage(1000, 1000), Some("llama-70b"), None),
            Decimal::ZERO
        );
    }

    #[test]
    fn table_pricing_via_prefix() {
        let resolver = sonnet_resolver();
        // 1M * $3/M + 100K * $15/M
        let cost = resolver.cost(&usage(1_000_000, 100_000), Some("sonnet-4"), None);
        assert_eq!(cost, Decimal::new(45, 1));
    }

    #[test]
    fn offline_mode_prices_nothing_from_table() {
        let resolver = PricingResolver::new(PricingMode::Offline, None);
        assert_eq!(
            resolver.cost(&usage(1000, 1000), Some("claude-sonnet-4"), None),
            Decimal::ZERO
        );
    }

    #[test]
    fn unreadable_pricing_file_costs_zero() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PricingResolver::new(PricingMode::File(dir.path().join("none.json")), None);
        assert_eq!(
            resolver.cost(&usage(1000, 1000), Some("claude-sonnet-4"), None),
            Decimal::ZERO
        );
    }
}
