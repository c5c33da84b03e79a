//! Unified usage loader for all sources

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::time::Instant;

use crate::core::{CalendarConfig, UsageEntry, UsageSnapshot, aggregate};
use crate::pricing::CostSource;
use crate::source::{DiscoveredFile, DiscoveryConfig, Source};

/// Discovers, parses and aggregates logs for a set of sources
pub(crate) struct UsageLoader<'a> {
    sources: Vec<&'a dyn Source>,
    discovery: DiscoveryConfig,
    pricing: &'a dyn CostSource,
}

impl<'a> UsageLoader<'a> {
    pub(crate) fn new(
        sources: Vec<&'a dyn Source>,
        discovery: DiscoveryConfig,
        pricing: &'a dyn CostSource,
    ) -> Self {
        UsageLoader {
            sources,
            discovery,
            pricing,
        }
    }

    /// Fresh snapshot of every enabled source as of `now`
    pub(crate) fn fetch_usage(&self, now: DateTime<Utc>, calendar: &CalendarConfig) -> UsageSnapshot {
        let entries = self.load_entries();

        let agg_start = Instant::now();
        let snapshot = aggregate(&entries, now, calendar);
        tracing::debug!(
            entries = entries.len(),
            elapsed_ms = agg_start.elapsed().as_secs_f64() * 1000.0,
            "aggregated usage"
        );
        snapshot
    }

    /// All entries from all sources, in discovery order
    pub(crate) fn load_entries(&self) -> Vec<UsageEntry> {
        let mut entries = Vec::new();
        for source in &self.sources {
            entries.extend(self.load_source(*source));
        }
        if tracing::enabled!(tracing::Level::DEBUG) {
            for source in &self.sources {
                let (count, tokens) = entries
                    .iter()
                    .filter(|e| e.source == source.kind())
                    .fold((0usize, 0u64), |(n, tokens), e| {
                        (n + 1, tokens.saturating_add(e.usage.total_tokens()))
                    });
                tracing::debug!(source = ?source.kind(), entries = count, tokens, "source totals");
            }
        }
        entries
    }

    /// Parallel file processing: discover → parse per file → flatten.
    /// Files are parsed concurrently, lines within a file sequentially.
    fn load_source(&self, source: &dyn Source) -> Vec<UsageEntry> {
        let discovery_start = Instant::now();
        let files: Vec<DiscoveredFile> = source.find_files(&self.discovery);
        tracing::debug!(
            source = source.display_name(),
            files = files.len(),
            elapsed_ms = discovery_start.elapsed().as_secs_f64() * 1000.0,
            "discovered log files"
        );

        if files.is_empty() {
            return Vec::new();
        }

        let parse_start = Instant::now();
        let per_file: Vec<Vec<UsageEntry>> = files
            .par_iter()
            .map(|file| source.parse_file(file, self.pricing))
            .collect();
        let entries: Vec<UsageEntry> = per_file.into_iter().flatten().collect();

        tracing::debug!(
            source = source.display_name(),
            entries = entries.len(),
            elapsed_ms = parse_start.elapsed().as_secs_f64() * 1000.0,
            "parsed log files"
        );
        entries
    }
}
