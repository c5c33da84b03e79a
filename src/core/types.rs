//! Core data types shared across all data sources
//!
//! These types represent the unified data model that all sources convert to,
//! and the snapshot the aggregator hands back to the caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Which agent tool produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SourceKind {
    Claude,
    Codex,
}

/// Token counts for one request or one aggregate
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct TokenCounts {
    pub(crate) input: u64,
    pub(crate) output: u64,
    pub(crate) cache_creation: u64,
    pub(crate) cache_read: u64,
}

impl TokenCounts {
    /// Field-wise sum, pinned at `u64::MAX`
    pub(crate) fn add(&mut self, other: &TokenCounts) {
        self.input = self.input.saturating_add(other.input);
        self.output = self.output.saturating_add(other.output);
        self.cache_creation = self.cache_creation.saturating_add(other.cache_creation);
        self.cache_read = self.cache_read.saturating_add(other.cache_read);
    }

    /// Cache creation plus cache read
    pub(crate) fn cache_tokens(&self) -> u64 {
        self.cache_creation.saturating_add(self.cache_read)
    }

    pub(crate) fn total_tokens(&self) -> u64 {
        sum_tokens(self.input, self.output, self.cache_tokens())
    }
}

fn sum_tokens(input: u64, output: u64, cache: u64) -> u64 {
    input.saturating_add(output).saturating_add(cache)
}

/// One normalized usage record derived from a single log line
#[derive(Debug, Clone)]
pub(crate) struct UsageEntry {
    pub(crate) source: SourceKind,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) session_id: Option<String>,
    /// Identity only, never aggregated
    pub(crate) request_id: Option<String>,
    pub(crate) message_id: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) usage: TokenCounts,
    /// USD, resolved at parse time
    pub(crate) cost: Decimal,
    pub(crate) cwd: Option<String>,
    pub(crate) git_branch: Option<String>,
}

/// Calendar-aligned reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UsagePeriod {
    Today,
    Week,
    Month,
}

impl UsagePeriod {
    pub(crate) fn all() -> [UsagePeriod; 3] {
        [UsagePeriod::Today, UsagePeriod::Week, UsagePeriod::Month]
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            UsagePeriod::Today => "Today",
            UsagePeriod::Week => "This Week",
            UsagePeriod::Month => "This Month",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub(crate) struct UsageMetrics {
    pub(crate) input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) cache_tokens: u64,
    pub(crate) cost_usd: Decimal,
    pub(crate) session_count: usize,
}

impl UsageMetrics {
    pub(crate) fn total_tokens(&self) -> u64 {
        sum_tokens(self.input_tokens, self.output_tokens, self.cache_tokens)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PeriodUsage {
    pub(crate) period: UsagePeriod,
    pub(crate) metrics: UsageMetrics,
}

/// Today's usage for one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ModelUsage {
    pub(crate) model_name: String,
    pub(crate) input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) cache_tokens: u64,
    pub(crate) cost_usd: Decimal,
}

impl ModelUsage {
    pub(crate) fn total_tokens(&self) -> u64 {
        sum_tokens(self.input_tokens, self.output_tokens, self.cache_tokens)
    }
}

/// Today's usage for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SessionUsage {
    pub(crate) session_id: String,
    pub(crate) display_name: String,
    pub(crate) input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) cache_tokens: u64,
    pub(crate) cost_usd: Decimal,
    pub(crate) first_seen: DateTime<Utc>,
    pub(crate) last_seen: DateTime<Utc>,
    pub(crate) request_count: usize,
}

impl SessionUsage {
    pub(crate) fn total_tokens(&self) -> u64 {
        sum_tokens(self.input_tokens, self.output_tokens, self.cache_tokens)
    }
}

/// Result of one usage fetch. Recomputed from scratch on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct UsageSnapshot {
    pub(crate) periods: Vec<PeriodUsage>,
    pub(crate) model_breakdown_today: Vec<ModelUsage>,
    pub(crate) session_breakdown_today: Vec<SessionUsage>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl UsageSnapshot {
    #[cfg(test)]
    pub(crate) fn empty(now: DateTime<Utc>) -> Self {
        UsageSnapshot {
            periods: UsagePeriod::all()
                .into_iter()
                .map(|period| PeriodUsage {
                    period,
                    metrics: UsageMetrics::default(),
                })
                .collect(),
            model_breakdown_today: Vec::new(),
            session_breakdown_today: Vec::new(),
            updated_at: now,
        }
    }

    pub(crate) fn metrics(&self, period: UsagePeriod) -> Option<&UsageMetrics> {
        self.periods
            .iter()
            .find(|p| p.period == period)
            .map(|p| &p.metrics)
    }

    pub(crate) fn today_metrics(&self) -> Option<&UsageMetrics> {
        self.metrics(UsagePeriod::Today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(input: u64, output: u64, creation: u64, read: u64) -> TokenCounts {
        TokenCounts {
            input,
            output,
            cache_creation: creation,
            cache_read: read,
        }
    }

    #[test]
    fn token_counts_default_all_zero() {
        let c = TokenCounts::default();
        assert_eq!(c.total_tokens(), 0);
        assert_eq!(c.cache_tokens(), 0);
    }

    #[test]
    fn cache_tokens_is_creation_plus_read() {
        let c = counts(1000, 500, 100, 50);
        assert_eq!(c.cache_tokens(), 150);
    }

    #[test]
    fn total_tokens_sums_input_output_and_cache() {
        let c = counts(1000, 500, 100, 50);
        assert_eq!(c.total_tokens(), 1650);
    }

    #[test]
    fn token_counts_add_saturates() {
        let mut a = counts(u64::MAX, 1, u64::MAX - 1, 0);
        a.add(&counts(1, 2, 5, u64::MAX));
        assert_eq!(a, counts(u64::MAX, 3, u64::MAX, u64::MAX));
        assert_eq!(a.cache_tokens(), u64::MAX);
        assert_eq!(a.total_tokens(), u64::MAX);
    }

    #[test]
    fn token_counts_add_accumulates_all_fields() {
        let mut a = counts(10, 20, 5, 3);
        a.add(&counts(100, 200, 50, 30));
        assert_eq!(a, counts(110, 220, 55, 33));
    }

    #[test]
    fn empty_snapshot_has_three_zero_periods() {
        let now = "2024-01-02T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let snapshot = UsageSnapshot::empty(now);
        assert_eq!(snapshot.periods.len(), 3);
        for period in UsagePeriod::all() {
            let m = snapshot.metrics(period).unwrap();
            assert_eq!(m.total_tokens(), 0);
            assert_eq!(m.cost_usd, Decimal::ZERO);
            assert_eq!(m.session_count, 0);
        }
        assert!(snapshot.model_breakdown_today.is_empty());
        assert!(snapshot.session_breakdown_today.is_empty());
        assert_eq!(snapshot.updated_at, now);
    }

    #[test]
    fn today_metrics_finds_today_period() {
        let now = Utc::now();
        let mut snapshot = UsageSnapshot::empty(now);
        snapshot.periods[0].metrics.input_tokens = 42;
        assert_eq!(snapshot.today_metrics().unwrap().input_tokens, 42);
    }

    #[test]
    fn period_titles() {
        assert_eq!(UsagePeriod::Today.title(), "Today");
        assert_eq!(UsagePeriod::Week.title(), "This Week");
        assert_eq!(UsagePeriod::Month.title(), "This Month");
    }
}
