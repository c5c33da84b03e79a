mod cache;
mod db;
mod provider;
mod resolver;
mod types;

pub(crate) use db::{CostSource, PricingMode, PricingResolver};
pub(crate) use types::TokenUsage;
