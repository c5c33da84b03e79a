//! Claude Code data source
//!
//! Parses JSONL logs from `projects/` under `~/.config/claude`, `~/.claude`
//! or the directories named in `CLAUDE_CONFIG_DIR`.

mod config;
mod parser;

pub(crate) use config::ClaudeSource;
