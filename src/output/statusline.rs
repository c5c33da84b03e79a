use crate::core::{UsagePeriod, UsageSnapshot};
use crate::output::format::{NumberFormat, format_compact, format_cost};

/// Single line for statusline/tmux integration
/// Format: "CC: $X.XX | In: XM Out: XK | Week: $X.XX | Month: $X.XX"
pub(crate) fn statusline(snapshot: &UsageSnapshot, label: &str, number_format: NumberFormat) -> String {
    let today = snapshot.today_metrics().cloned().unwrap_or_default();
    let week_cost = snapshot
        .metrics(UsagePeriod::Week)
        .map(|m| m.cost_usd)
        .unwrap_or_default();
    let month_cost = snapshot
        .metrics(UsagePeriod::Month)
        .map(|m| m.cost_usd)
        .unwrap_or_default();

    [
        format!("{label}: {}", format_cost(today.cost_usd, number_format)),
        format!(
            "In: {} Out: {}",
            format_compact(today.input_tokens, number_format),
            format_compact(today.output_tokens, number_format)
        ),
        format!("Week: {}", format_cost(week_cost, number_format)),
        format!("Month: {}", format_cost(month_cost, number_format)),
    ]
    .join(" | ")
}

/// Statusline as JSON for programmatic consumption
pub(crate) fn statusline_json(snapshot: &UsageSnapshot, label: &str, number_format: NumberFormat) -> String {
    let today = snapshot.today_metrics().cloned().unwrap_or_default();
    let cost_of = |period| {
        snapshot
            .metrics(period)
            .map(|m| m.cost_usd)
            .unwrap_or_default()
    };

    let output = serde_json::json!({
        "source": label,
        "input_tokens": today.input_tokens,
        "output_tokens": today.output_tokens,
        "cache_tokens": today.cache_tokens,
        "total_tokens": today.total_tokens(),
        "sessions": today.session_count,
        "cost": today.cost_usd,
        "week_cost": cost_of(UsagePeriod::Week),
        "month_cost": cost_of(UsagePeriod::Month),
        "formatted": {
            "cost": format_cost(today.cost_usd, number_format),
            "input": format_compact(today.input_tokens, number_format),
            "output": format_compact(today.output_tokens, number_format),
        }
    });

    serde_json::to_string(&output).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize statusline JSON");
        "{}".to_string()
    })
}
