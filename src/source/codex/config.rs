//! OpenAI Codex CLI data source configuration
//!
//! Defines the CodexSource implementation of the Source trait.

use crate::core::{SourceKind, UsageEntry};
use crate::pricing::CostSource;
use crate::source::{DiscoveredFile, Source};

use super::parser::parse_codex_file;

/// Codex data source. Entries are never priced.
#[derive(Debug, Default)]
pub(crate) struct CodexSource;

impl Source for CodexSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Codex
    }

    fn name(&self) -> &'static str {
        "codex"
    }

    fn display_name(&self) -> &'static str {
        "OpenAI Codex"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["cx"]
    }

    fn parse_file(&self, file: &DiscoveredFile, _pricing: &dyn CostSource) -> Vec<UsageEntry> {
        parse_codex_file(file)
    }
}
