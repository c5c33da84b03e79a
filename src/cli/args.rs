//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::Weekday;
use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigColorMode};
use crate::error::AppError;
use crate::source::{Source, all_sources, get_source};

use super::commands::Commands;

/// Used when neither the flag nor the config names a source
const DEFAULT_SOURCE: &str = "claude";

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Debug, Parser)]
#[command(name = "tokenbar")]
#[command(
    about = "Today / week / month token usage and cost for Claude Code and OpenAI Codex",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Log source: claude (cc), codex (cx) or all
    #[arg(short, long, global = true, value_name = "SOURCE")]
    pub(crate) source: Option<String>,

    /// Skip price table download; only costs recorded in the logs count
    #[arg(short = 'O', long, global = true)]
    pub(crate) offline: bool,

    /// Read the LiteLLM price table from a local JSON file
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) pricing_file: Option<PathBuf>,

    /// Download the price table from this URL instead of LiteLLM
    #[arg(long, global = true, value_name = "URL")]
    pub(crate) pricing_url: Option<String>,

    /// Timezone for calendar windows (e.g., "Asia/Shanghai", "UTC", "America/New_York")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// First day of the week (e.g., "mon", "sunday")
    #[arg(long, global = true, value_name = "DAY")]
    pub(crate) week_start: Option<String>,

    /// Days of the new year the first week must contain (1-7)
    #[arg(long, global = true, value_name = "DAYS")]
    pub(crate) min_days_in_first_week: Option<u8>,

    /// Pin "now" (RFC 3339 or YYYY-MM-DD)
    #[arg(long, global = true, value_name = "INSTANT")]
    pub(crate) now: Option<String>,

    /// Locale for number formatting (e.g., "en", "zh", "de")
    #[arg(long, global = true, value_name = "LOCALE")]
    pub(crate) locale: Option<String>,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Compact output (fewer columns, K/M/B token counts)
    #[arg(short = 'c', long, global = true)]
    pub(crate) compact: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub(crate) debug: bool,

    /// Log directories and pricing settings that only exist in the config file
    #[arg(skip)]
    pub(crate) claude_dirs: Vec<PathBuf>,

    #[arg(skip)]
    pub(crate) codex_home: Option<PathBuf>,

    #[arg(skip)]
    pub(crate) pricing_max_age_hours: Option<u64>,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        self.offline |= config.offline;
        self.compact |= config.compact;
        self.debug |= config.debug;

        if let Some(color) = config.color
            && self.color == ColorMode::Auto
        {
            self.color = match color {
                ConfigColorMode::Auto => ColorMode::Auto,
                ConfigColorMode::Always => ColorMode::Always,
                ConfigColorMode::Never => ColorMode::Never,
            };
        }

        // String options: only apply if CLI didn't set them
        self.source = self.source.or(config.source);
        self.pricing_file = self.pricing_file.or(config.pricing_file);
        self.pricing_url = self.pricing_url.or(config.pricing_url);
        self.timezone = self.timezone.or(config.timezone);
        self.week_start = self.week_start.or(config.week_start);
        self.min_days_in_first_week = self
            .min_days_in_first_week
            .or(config.min_days_in_first_week);
        self.locale = self.locale.or(config.locale);

        self.claude_dirs = config.claude_dirs;
        self.codex_home = config.codex_home;
        self.pricing_max_age_hours = config.pricing_max_age_hours;

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    /// Sources selected by `--source`, in registry order for `all`
    pub(crate) fn sources(&self) -> Result<Vec<&'static dyn Source>, AppError> {
        let name = self.source.as_deref().unwrap_or(DEFAULT_SOURCE).trim();
        if name.eq_ignore_ascii_case("all") {
            return Ok(all_sources());
        }
        get_source(name)
            .map(|source| vec![source])
            .ok_or_else(|| AppError::UnknownSource {
                input: name.to_string(),
            })
    }

    pub(crate) fn first_weekday(&self) -> Result<Weekday, AppError> {
        let Some(raw) = self.week_start.as_deref() else {
            return Ok(Weekday::Mon);
        };
        raw.trim()
            .parse::<Weekday>()
            .map_err(|_| AppError::InvalidWeekStart {
                input: raw.to_string(),
            })
    }

    pub(crate) fn min_days_in_first_week(&self) -> Result<u8, AppError> {
        match self.min_days_in_first_week {
            None => Ok(4),
            Some(value @ 1..=7) => Ok(value),
            Some(value) => Err(AppError::InvalidMinDays { value }),
        }
    }
}
