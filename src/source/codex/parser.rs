//! OpenAI Codex CLI JSONL parser
//!
//! Codex writes `event_msg` lines holding either the last turn's usage or a
//! running total since session start. Totals are turned into deltas against
//! the previous reading in the same file.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::core::{SourceKind, TokenCounts, UsageEntry};
use crate::source::DiscoveredFile;

const EVENT_MSG: &str = "event_msg";
const TURN_CONTEXT: &str = "turn_context";

// ============================================================================
// Internal types for JSONL parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct CodexLine {
    #[serde(rename = "type")]
    line_type: String,
    timestamp: Option<String>,
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    info: Option<TokenInfo>,
    message_id: Option<String>,
    request_id: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    last_token_usage: Option<RawUsage>,
    total_token_usage: Option<RawUsage>,
    model: Option<String>,
    model_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
struct RawUsage {
    input_tokens: Option<u64>,
    cached_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    reasoning_output_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

/// Normalized Codex counters, either a delta or a running total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct CodexUsage {
    pub(super) input: u64,
    pub(super) cached: u64,
    pub(super) output: u64,
    pub(super) reasoning: u64,
    pub(super) total: u64,
}

impl RawUsage {
    fn normalize(&self) -> CodexUsage {
        let input = self.input_tokens.unwrap_or(0);
        let output = self.output_tokens.unwrap_or(0);
        CodexUsage {
            input,
            cached: self
                .cached_input_tokens
                .filter(|&n| n > 0)
                .or(self.cache_read_input_tokens)
                .unwrap_or(0),
            output,
            reasoning: self.reasoning_output_tokens.unwrap_or(0),
            total: self
                .total_tokens
                .filter(|&n| n > 0)
                .unwrap_or(input.saturating_add(output)),
        }
    }
}

impl CodexUsage {
    pub(super) fn saturating_sub(&self, prev: &CodexUsage) -> CodexUsage {
        CodexUsage {
            input: self.input.saturating_sub(prev.input),
            cached: self.cached.saturating_sub(prev.cached),
            output: self.output.saturating_sub(prev.output),
            reasoning: self.reasoning.saturating_sub(prev.reasoning),
            total: self.total.saturating_sub(prev.total),
        }
    }

    pub(super) fn is_empty(&self) -> bool {
        self.input == 0 && self.cached == 0 && self.output == 0 && self.reasoning == 0
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn event_model(payload: &Payload) -> Option<String> {
    payload
        .info
        .as_ref()
        .and_then(|info| non_empty(&info.model).or_else(|| non_empty(&info.model_name)))
        .or_else(|| non_empty(&payload.model))
}

pub(super) fn parse_codex_file(file: &DiscoveredFile) -> Vec<UsageEntry> {
    let handle = match File::open(&file.path) {
        Ok(f) => f,
        Err(err) => {
            tracing::debug!(path = %file.path.display(), error = %err, "failed to open log file");
            return Vec::new();
        }
    };

    let label = file.path.display().to_string();
    parse_codex_lines(BufReader::new(handle), file.session_hint.as_deref(), &label)
}

pub(super) fn parse_codex_lines(
    reader: impl BufRead,
    session_hint: Option<&str>,
    label: &str,
) -> Vec<UsageEntry> {
    let mut entries = Vec::new();
    let mut previous_totals = CodexUsage::default();
    let mut current_model: Option<String> = None;
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::debug!(file = label, line = line_no + 1, error = %err, "failed to read line");
                skipped += 1;
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Ok(raw) = serde_json::from_str::<CodexLine>(trimmed) else {
            skipped += 1;
            continue;
        };

        if raw.line_type == TURN_CONTEXT {
            if let Some(model) = raw.payload.as_ref().and_then(|p| non_empty(&p.model)) {
                current_model = Some(model);
            }
            continue;
        }

        if raw.line_type != EVENT_MSG {
            continue;
        }

        let Some(timestamp) = raw
            .timestamp
            .as_deref()
            .and_then(|ts| ts.parse::<DateTime<Utc>>().ok())
        else {
            skipped += 1;
            continue;
        };

        let Some(payload) = raw.payload else {
            continue;
        };
        let Some(info) = &payload.info else {
            continue;
        };

        let total = info.total_token_usage.map(|u| u.normalize());
        let delta = match (info.last_token_usage, total) {
            (Some(last), _) => Some(last.normalize()),
            (None, Some(total)) => Some(total.saturating_sub(&previous_totals)),
            (None, None) => None,
        };
        if let Some(total) = total {
            previous_totals = total;
        }

        let Some(delta) = delta else {
            continue;
        };
        if delta.is_empty() {
            continue;
        }

        let model = event_model(&payload).or_else(|| current_model.clone());

        entries.push(UsageEntry {
            source: SourceKind::Codex,
            timestamp,
            session_id: session_hint.map(str::to_string),
            request_id: payload.request_id,
            message_id: payload.message_id,
            model,
            usage: TokenCounts {
                input: delta.input,
                output: delta.output,
                cache_creation: 0,
                cache_read: delta.cached,
            },
            cost: Decimal::ZERO,
            cwd: None,
            git_branch: None,
        });
    }

    tracing::debug!(
        file = label,
        entries = entries.len(),
        skipped,
        "parsed codex log"
    );
    entries
}
