//! OpenAI Codex CLI data source
//!
//! Parses JSONL logs from `sessions/` under `~/.codex` or `CODEX_HOME`.
//! Codex logs carry cumulative token counts that need delta computation.

mod config;
mod parser;

pub(crate) use config::CodexSource;
