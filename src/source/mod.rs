//! Data source abstraction layer
//!
//! Each agent tool (Claude, Codex) implements the Source trait to turn its
//! log files into unified usage entries.

pub(crate) mod claude;
pub(crate) mod codex;
pub(crate) mod discovery;
pub(crate) mod loader;
pub(crate) mod registry;

use crate::core::{SourceKind, UsageEntry};
use crate::pricing::CostSource;

pub(crate) use discovery::{DiscoveredFile, DiscoveryConfig, discover};

/// Data source trait - implemented by each agent tool
pub(crate) trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Unique name for this source (used by `--source`)
    fn name(&self) -> &'static str;

    /// Display name for output
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Short aliases for CLI (e.g., "cc" for "claude")
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Find all log files for this source under the configured roots
    fn find_files(&self, config: &DiscoveryConfig) -> Vec<DiscoveredFile> {
        config
            .roots(self.kind())
            .iter()
            .flat_map(|root| discover(root, self.kind()))
            .collect()
    }

    /// Parse a single file into usage entries, in line order
    fn parse_file(&self, file: &DiscoveredFile, pricing: &dyn CostSource) -> Vec<UsageEntry>;
}

/// Box type for dynamic dispatch
pub(crate) type BoxedSource = Box<dyn Source>;

pub(crate) use loader::UsageLoader;
pub(crate) use registry::{all_sources, get_source};
