//! Core module - shared types and logic for all data sources

mod aggregator;
mod calendar;
mod dedup;
mod types;

pub(crate) use aggregator::aggregate;
pub(crate) use calendar::CalendarConfig;
pub(crate) use dedup::{DedupSet, unique_hash};
pub(crate) use types::{
    ModelUsage, PeriodUsage, SessionUsage, SourceKind, TokenCounts, UsageEntry, UsagePeriod,
    UsageSnapshot,
};
