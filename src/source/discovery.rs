//! Log root resolution and `.jsonl` file discovery
//!
//! Roots come from an explicit [`DiscoveryConfig`]; nothing here reads the
//! environment.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

use crate::core::SourceKind;

const CLAUDE_SUBDIR: &str = "projects";
const CODEX_SUBDIR: &str = "sessions";

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Where to look for logs
#[derive(Debug, Clone, Default)]
pub(crate) struct DiscoveryConfig {
    pub(crate) home: Option<PathBuf>,
    /// Replaces the default Claude directories when non-empty
    pub(crate) claude_dirs: Vec<PathBuf>,
    /// Replaces `~/.codex` when set
    pub(crate) codex_home: Option<PathBuf>,
}

/// One log file and the source it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DiscoveredFile {
    pub(crate) path: PathBuf,
    /// File stem, used when a line carries no session id
    pub(crate) session_hint: Option<String>,
    pub(crate) source: SourceKind,
}

impl DiscoveryConfig {
    /// Existing `projects`/`sessions` directories for `source`
    pub(crate) fn roots(&self, source: SourceKind) -> Vec<PathBuf> {
        let (candidates, subdir) = match source {
            SourceKind::Claude => (self.claude_candidates(), CLAUDE_SUBDIR),
            SourceKind::Codex => (self.codex_candidates(), CODEX_SUBDIR),
        };

        let roots: Vec<PathBuf> = candidates
            .iter()
            .map(|dir| dir.join(subdir))
            .filter(|path| path.is_dir())
            .collect();

        if roots.is_empty() {
            tracing::debug!(?source, searched = ?candidates, "no log roots found");
        }
        roots
    }

    fn claude_candidates(&self) -> Vec<PathBuf> {
        if !self.claude_dirs.is_empty() {
            return self.claude_dirs.clone();
        }
        match &self.home {
            Some(home) => vec![home.join(".config").join("claude"), home.join(".claude")],
            None => Vec::new(),
        }
    }

    fn codex_candidates(&self) -> Vec<PathBuf> {
        if let Some(codex_home) = &self.codex_home {
            return vec![codex_home.clone()];
        }
        match &self.home {
            Some(home) => vec![home.join(".codex")],
            None => Vec::new(),
        }
    }
}

/// All non-hidden `.jsonl` files under `root`, sorted by path
pub(crate) fn discover(root: &Path, source: SourceKind) -> Vec<DiscoveredFile> {
    let Some(root_str) = root.to_str() else {
        tracing::debug!(root = %root.display(), "skipping non UTF-8 log root");
        return Vec::new();
    };
    let pattern = format!("{}/**/*.jsonl", Pattern::escape(root_str));

    let paths = match glob::glob_with(&pattern, GLOB_OPTIONS) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::debug!(%pattern, error = %err, "invalid discovery pattern");
            return Vec::new();
        }
    };

    let mut files: Vec<DiscoveredFile> = paths
        .flatten()
        .filter(|path| path.is_file())
        .map(|path| DiscoveredFile {
            session_hint: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
            path,
            source,
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    if files.is_empty() {
        tracing::debug!(root = %root.display(), "no log files found");
    }
    files
}
