use serde::Serialize;

use crate::core::{ModelUsage, SessionUsage, UsageSnapshot};

#[derive(Serialize)]
struct SnapshotReport<'a> {
    sources: &'a [&'a str],
    #[serde(flatten)]
    snapshot: &'a UsageSnapshot,
}

fn to_pretty(value: &impl Serialize, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize JSON output");
        fallback.to_string()
    })
}

/// Whole snapshot; costs are decimal strings
pub(crate) fn snapshot_json(snapshot: &UsageSnapshot, sources: &[&str]) -> String {
    to_pretty(&SnapshotReport { sources, snapshot }, "{}")
}

pub(crate) fn models_json(models: &[ModelUsage]) -> String {
    to_pretty(&models, "[]")
}

pub(crate) fn sessions_json(sessions: &[SessionUsage]) -> String {
    to_pretty(&sessions, "[]")
}
