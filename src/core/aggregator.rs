//! Windowed aggregation of usage entries
//!
//! Turns a flat entry list into period totals plus today's per-model and
//! per-session breakdowns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::consts::{SESSION_SUFFIX_LEN, UNKNOWN_MODEL};
use crate::core::calendar::{CalendarConfig, Window};
use crate::core::types::{
    ModelUsage, PeriodUsage, SessionUsage, TokenCounts, UsageEntry, UsageMetrics, UsagePeriod,
    UsageSnapshot,
};

pub(crate) fn aggregate(
    entries: &[UsageEntry],
    now: DateTime<Utc>,
    calendar: &CalendarConfig,
) -> UsageSnapshot {
    let windows = calendar.windows(now);

    let periods = UsagePeriod::all()
        .into_iter()
        .map(|period| {
            let window = match period {
                UsagePeriod::Today => windows.today,
                UsagePeriod::Week => windows.week,
                UsagePeriod::Month => windows.month,
            };
            PeriodUsage {
                period,
                metrics: summarize(entries, window),
            }
        })
        .collect();

    UsageSnapshot {
        periods,
        model_breakdown_today: summarize_models(entries, windows.today),
        session_breakdown_today: summarize_sessions(entries, windows.today),
        updated_at: now,
    }
}

pub(crate) fn summarize(entries: &[UsageEntry], window: Window) -> UsageMetrics {
    let mut tokens = TokenCounts::default();
    let mut cost = Decimal::ZERO;
    let mut sessions: HashSet<&str> = HashSet::new();

    for entry in entries.iter().filter(|e| window.contains(e.timestamp)) {
        tokens.add(&entry.usage);
        cost = cost.saturating_add(entry.cost);
        if let Some(session_id) = entry.session_id.as_deref() {
            sessions.insert(session_id);
        }
    }

    UsageMetrics {
        input_tokens: tokens.input,
        output_tokens: tokens.output,
        cache_tokens: tokens.cache_tokens(),
        cost_usd: cost,
        session_count: sessions.len(),
    }
}

pub(crate) fn summarize_models(entries: &[UsageEntry], window: Window) -> Vec<ModelUsage> {
    let mut models: HashMap<&str, (TokenCounts, Decimal)> = HashMap::new();

    for entry in entries.iter().filter(|e| window.contains(e.timestamp)) {
        let name = entry.model.as_deref().unwrap_or(UNKNOWN_MODEL);
        let (tokens, cost) = models.entry(name).or_default();
        tokens.add(&entry.usage);
        *cost = cost.saturating_add(entry.cost);
    }

    let mut result: Vec<ModelUsage> = models
        .into_iter()
        .map(|(name, (tokens, cost))| ModelUsage {
            model_name: name.to_string(),
            input_tokens: tokens.input,
            output_tokens: tokens.output,
            cache_tokens: tokens.cache_tokens(),
            cost_usd: cost,
        })
        .collect();

    result.sort_by(|a, b| {
        b.cost_usd
            .cmp(&a.cost_usd)
            .then_with(|| b.total_tokens().cmp(&a.total_tokens()))
            .then_with(|| a.model_name.cmp(&b.model_name))
    });
    result
}

/// Session accumulator for building session usage
#[derive(Debug)]
struct SessionAccumulator<'a> {
    cwd: Option<&'a str>,
    git_branch: Option<&'a str>,
    tokens: TokenCounts,
    cost: Decimal,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    request_count: usize,
}

impl<'a> SessionAccumulator<'a> {
    fn new(timestamp: DateTime<Utc>) -> Self {
        SessionAccumulator {
            cwd: None,
            git_branch: None,
            tokens: TokenCounts::default(),
            cost: Decimal::ZERO,
            first_seen: timestamp,
            last_seen: timestamp,
            request_count: 0,
        }
    }

    fn add_entry(&mut self, entry: &'a UsageEntry) {
        self.tokens.add(&entry.usage);
        self.cost = self.cost.saturating_add(entry.cost);
        self.request_count += 1;
        self.first_seen = self.first_seen.min(entry.timestamp);
        self.last_seen = self.last_seen.max(entry.timestamp);
        // first entry that names them wins
        if self.cwd.is_none() {
            self.cwd = entry.cwd.as_deref();
        }
        if self.git_branch.is_none() {
            self.git_branch = entry.git_branch.as_deref();
        }
    }

    fn into_session_usage(self, session_id: &str) -> SessionUsage {
        SessionUsage {
            session_id: session_id.to_string(),
            display_name: session_display_name(self.cwd, self.git_branch, session_id),
            input_tokens: self.tokens.input,
            output_tokens: self.tokens.output,
            cache_tokens: self.tokens.cache_tokens(),
            cost_usd: self.cost,
            first_seen: self.first_seen,
            last_seen: self.last_seen,
            request_count: self.request_count,
        }
    }
}

pub(crate) fn summarize_sessions(entries: &[UsageEntry], window: Window) -> Vec<SessionUsage> {
    let mut sessions: HashMap<&str, SessionAccumulator<'_>> = HashMap::new();

    for entry in entries.iter().filter(|e| window.contains(e.timestamp)) {
        let Some(session_id) = entry.session_id.as_deref() else {
            continue;
        };
        sessions
            .entry(session_id)
            .or_insert_with(|| SessionAccumulator::new(entry.timestamp))
            .add_entry(entry);
    }

    let mut result: Vec<SessionUsage> = sessions
        .into_iter()
        .map(|(id, acc)| acc.into_session_usage(id))
        .collect();

    result.sort_by(|a, b| {
        b.last_seen
            .cmp(&a.last_seen)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    result
}

/// Human label for a session: project folder and branch, or a short id
pub(crate) fn session_display_name(
    cwd: Option<&str>,
    git_branch: Option<&str>,
    session_id: &str,
) -> String {
    if let Some(cwd) = cwd {
        let project = Path::new(cwd)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(cwd);
        return match git_branch {
            Some(branch) => format!("{project} ({branch})"),
            None => project.to_string(),
        };
    }

    let char_count = session_id.chars().count();
    let suffix: String = session_id
        .chars()
        .skip(char_count.saturating_sub(SESSION_SUFFIX_LEN))
        .collect();
    format!("Session {suffix}")
}
