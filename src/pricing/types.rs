use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-token USD rates for one model. Absent rates price at zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct ModelPricing {
    #[serde(default, rename = "input_cost_per_token")]
    pub(crate) input: Option<f64>,
    #[serde(default, rename = "output_cost_per_token")]
    pub(crate) output: Option<f64>,
    #[serde(default, rename = "cache_creation_input_token_cost")]
    pub(crate) cache_create: Option<f64>,
    #[serde(default, rename = "cache_read_input_token_cost")]
    pub(crate) cache_read: Option<f64>,
    #[serde(default, rename = "input_cost_per_token_above_200k_tokens")]
    pub(crate) input_above_200k: Option<f64>,
    #[serde(default, rename = "output_cost_per_token_above_200k_tokens")]
    pub(crate) output_above_200k: Option<f64>,
    #[serde(default, rename = "cache_creation_input_token_cost_above_200k_tokens")]
    pub(crate) cache_create_above_200k: Option<f64>,
    #[serde(default, rename = "cache_read_input_token_cost_above_200k_tokens")]
    pub(crate) cache_read_above_200k: Option<f64>,
}

/// Token counts fed to the cost calculation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TokenUsage {
    pub(crate) input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) cache_creation_tokens: u64,
    pub(crate) cache_read_tokens: u64,
}

/// One immutable snapshot of the model price table
#[derive(Debug, Default)]
pub(crate) struct PriceTable {
    pub(super) models: HashMap<String, ModelPricing>,
    /// requested name -> matched table key, `None` when nothing matched
    pub(super) resolved: Mutex<HashMap<String, Option<String>>>,
}

impl PriceTable {
    pub(crate) fn new(models: HashMap<String, ModelPricing>) -> Self {
        PriceTable {
            models,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.models.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
