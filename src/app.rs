use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::{Cli, Commands};
use crate::core::{CalendarConfig, UsageSnapshot};
use crate::error::AppError;
use crate::output::{
    NumberFormat, TableOptions, models_json, print_models, print_sessions, print_summary,
    sessions_json, snapshot_json, statusline, statusline_json,
};
use crate::pricing::{PricingMode, PricingResolver};
use crate::source::{DiscoveryConfig, Source, UsageLoader};
use crate::utils::{Timezone, parse_instant};

const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";
const CODEX_HOME_ENV: &str = "CODEX_HOME";

/// Environment inputs for log discovery, read once at startup
#[derive(Debug, Default)]
struct DiscoveryEnv {
    home: Option<PathBuf>,
    claude_config_dir: Option<String>,
    codex_home: Option<String>,
}

impl DiscoveryEnv {
    fn from_process() -> Self {
        DiscoveryEnv {
            home: dirs::home_dir(),
            claude_config_dir: std::env::var(CLAUDE_CONFIG_DIR_ENV).ok(),
            codex_home: std::env::var(CODEX_HOME_ENV).ok(),
        }
    }
}

/// Environment beats config file; empty values are ignored
fn discovery_config(cli: &Cli, env: DiscoveryEnv) -> Result<DiscoveryConfig, AppError> {
    let env_claude_dirs: Vec<PathBuf> = env
        .claude_config_dir
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .collect();

    let claude_dirs = if env_claude_dirs.is_empty() {
        cli.claude_dirs.clone()
    } else {
        env_claude_dirs
    };

    let codex_home = env
        .codex_home
        .as_deref()
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| cli.codex_home.clone());

    if env.home.is_none() && claude_dirs.is_empty() && codex_home.is_none() {
        return Err(AppError::HomeDirUnavailable);
    }

    Ok(DiscoveryConfig {
        home: env.home,
        claude_dirs,
        codex_home,
    })
}

/// A local price file wins over `--offline`, which only rules out the network
fn pricing_mode(cli: &Cli) -> PricingMode {
    if let Some(path) = &cli.pricing_file {
        PricingMode::File(path.clone())
    } else if cli.offline {
        PricingMode::Offline
    } else if let Some(url) = &cli.pricing_url {
        PricingMode::RemoteUrl(url.clone())
    } else {
        PricingMode::Remote
    }
}

fn statusline_label(sources: &[&dyn Source]) -> &'static str {
    match sources {
        [source] => source.display_name(),
        _ => "All",
    }
}

fn render(
    cli: &Cli,
    command: Commands,
    snapshot: &UsageSnapshot,
    calendar: &CalendarConfig,
    sources: &[&dyn Source],
    number_format: NumberFormat,
) {
    let table_options = TableOptions {
        use_color: cli.use_color(),
        compact: cli.compact,
        number_format,
    };

    match (command, cli.json) {
        (Commands::Summary, true) => {
            let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
            println!("{}", snapshot_json(snapshot, &names));
        }
        (Commands::Summary, false) => print_summary(snapshot, calendar, &table_options),
        (Commands::Models, true) => println!("{}", models_json(&snapshot.model_breakdown_today)),
        (Commands::Models, false) => print_models(snapshot, &table_options),
        (Commands::Sessions, true) => {
            println!("{}", sessions_json(&snapshot.session_breakdown_today))
        }
        (Commands::Sessions, false) => print_sessions(snapshot, calendar.timezone, &table_options),
        (Commands::Statusline, true) => println!(
            "{}",
            statusline_json(snapshot, statusline_label(sources), number_format)
        ),
        (Commands::Statusline, false) => println!(
            "{}",
            statusline(snapshot, statusline_label(sources), number_format)
        ),
    }
}

pub(crate) fn run(cli: &Cli) -> Result<(), AppError> {
    let timezone = Timezone::parse(cli.timezone.as_deref())?;
    let number_format = NumberFormat::from_locale(cli.locale.as_deref())?;
    let calendar = CalendarConfig {
        timezone,
        first_weekday: cli.first_weekday()?,
        min_days_in_first_week: cli.min_days_in_first_week()?,
    };
    let now = match cli.now.as_deref() {
        Some(raw) => parse_instant(raw, timezone)?,
        None => Utc::now(),
    };
    let sources = cli.sources()?;
    let discovery = discovery_config(cli, DiscoveryEnv::from_process())?;

    let max_age = cli
        .pricing_max_age_hours
        .map(|hours| Duration::from_secs(hours.saturating_mul(3600)));
    let pricing = PricingResolver::new(pricing_mode(cli), max_age);

    let loader = UsageLoader::new(sources.clone(), discovery, &pricing);
    let snapshot = loader.fetch_usage(now, &calendar);

    render(
        cli,
        cli.command.unwrap_or_default(),
        &snapshot,
        &calendar,
        &sources,
        number_format,
    );
    Ok(())
}
