//! Source registry
//!
//! Fixed list of log sources in reporting order, looked up by name or alias.

use std::sync::LazyLock;

use super::claude::ClaudeSource;
use super::codex::CodexSource;
use super::{BoxedSource, Source};

/// Claude first, then Codex; `--source all` reports in this order
static SOURCES: LazyLock<Vec<BoxedSource>> =
    LazyLock::new(|| vec![Box::new(ClaudeSource), Box::new(CodexSource)]);

fn matches_name(source: &dyn Source, name: &str) -> bool {
    source.name().eq_ignore_ascii_case(name)
        || source
            .aliases()
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(name))
}

/// Case-insensitive lookup by name or alias
pub(crate) fn get_source(name: &str) -> Option<&'static dyn Source> {
    let name = name.trim();
    SOURCES.iter().find_map(|s| {
        let source: &'static dyn Source = s.as_ref();
        matches_name(source, name).then_some(source)
    })
}

pub(crate) fn all_sources() -> Vec<&'static dyn Source> {
    SOURCES.iter().map(|s| s.as_ref()).collect()
}
