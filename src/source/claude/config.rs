//! Claude Code data source configuration
//!
//! Defines the ClaudeSource implementation of the Source trait.

use crate::core::{SourceKind, UsageEntry};
use crate::pricing::CostSource;
use crate::source::{DiscoveredFile, Source};

use super::parser::parse_claude_file;

/// Claude data source
#[derive(Debug, Default)]
pub(crate) struct ClaudeSource;

impl Source for ClaudeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Claude
    }

    fn name(&self) -> &'static str {
        "claude"
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["cc"]
    }

    fn parse_file(&self, file: &DiscoveredFile, pricing: &dyn CostSource) -> Vec<UsageEntry> {
        parse_claude_file(file, pricing)
    }
}
