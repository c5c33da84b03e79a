//! Claude Code JSONL parser
//!
//! Each line that carries `message.usage` is one request with absolute
//! token counts. Streaming replays repeat lines, so entries are deduplicated
//! per file on `message.id:requestId`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::core::{DedupSet, SourceKind, TokenCounts, UsageEntry, unique_hash};
use crate::pricing::{CostSource, TokenUsage};
use crate::source::DiscoveredFile;

// ============================================================================
// Internal types for JSONL parsing
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaudeLine {
    timestamp: DateTime<Utc>,
    session_id: Option<String>,
    request_id: Option<String>,
    #[serde(rename = "costUSD")]
    cost_usd: Option<f64>,
    cwd: Option<String>,
    git_branch: Option<String>,
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    id: Option<String>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
struct Usage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

impl Usage {
    fn counts(&self) -> TokenCounts {
        TokenCounts {
            input: self.input_tokens.unwrap_or(0),
            output: self.output_tokens.unwrap_or(0),
            cache_creation: self.cache_creation_input_tokens.unwrap_or(0),
            cache_read: self.cache_read_input_tokens.unwrap_or(0),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

pub(super) fn parse_claude_file(file: &DiscoveredFile, pricing: &dyn CostSource) -> Vec<UsageEntry> {
    let handle = match File::open(&file.path) {
        Ok(f) => f,
        Err(err) => {
            tracing::debug!(path = %file.path.display(), error = %err, "failed to open log file");
            return Vec::new();
        }
    };

    let label = file.path.display().to_string();
    parse_claude_lines(
        BufReader::new(handle),
        file.session_hint.as_deref(),
        pricing,
        &label,
    )
}

pub(super) fn parse_claude_lines(
    reader: impl BufRead,
    session_hint: Option<&str>,
    pricing: &dyn CostSource,
    label: &str,
) -> Vec<UsageEntry> {
    let mut entries = Vec::new();
    let mut dedup = DedupSet::new();
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

        if line.trim().is_empty() {
            continue;
        }

        let Ok(parsed) = serde_json::from_str::<ClaudeLine>(&line) else {
            skipped += 1;
            continue;
        };

        let Some(usage) = parsed.message.usage else {
            skipped += 1;
            continue;
        };

        if !dedup.admit(unique_hash(
            parsed.message.id.as_deref(),
            parsed.request_id.as_deref(),
        )) {
            continue;
        }

        entries.push(into_entry(parsed, usage.counts(), session_hint, pricing));
    }

    tracing::debug!(
        file = label,
        entries = entries.len(),
        skipped,
        duplicates = dedup.duplicates(),
        "parsed claude log"
    );
    entries
}

fn into_entry(
    line: ClaudeLine,
    usage: TokenCounts,
    session_hint: Option<&str>,
    pricing: &dyn CostSource,
) -> UsageEntry {
    let model = line.message.model;

    let cost = pricing.cost(
        &TokenUsage {
            input_tokens: usage.input,
            output_tokens: usage.output,
            cache_creation_tokens: usage.cache_creation,
            cache_read_tokens: usage.cache_read,
        },
        model.as_deref(),
        line.cost_usd,
    );

    UsageEntry {
        source: SourceKind::Claude,
        timestamp: line.timestamp,
        session_id: line
            .session_id
            .or_else(|| session_hint.map(str::to_string)),
        request_id: line.request_id,
        message_id: line.message.id,
        model,
        usage,
        cost,
        cwd: line.cwd,
        git_branch: line.git_branch,
    }
}
