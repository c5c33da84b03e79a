use comfy_table::{Cell, Color, Table};
use rust_decimal::Decimal;

use crate::core::{CalendarConfig, ModelUsage, PeriodUsage, SessionUsage, UsagePeriod, UsageSnapshot};
use crate::output::format::{
    Emphasis, NumberFormat, create_styled_table, format_compact, format_cost, format_number,
    header_cell, number_cell, text_cell,
};
use crate::utils::Timezone;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TableOptions {
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
    pub(crate) number_format: NumberFormat,
}

impl TableOptions {
    fn tokens(&self, n: u64) -> String {
        if self.compact {
            format_compact(n, self.number_format)
        } else {
            format_number(n, self.number_format)
        }
    }

    fn cost(&self, cost: Decimal) -> String {
        format_cost(cost, self.number_format)
    }

    fn emphasis(&self, color: Color, bold: bool) -> Emphasis {
        Emphasis {
            color: self.use_color.then_some(color),
            bold,
        }
    }
}

/// Period label with the calendar position of the snapshot instant
fn period_label(period: &PeriodUsage, snapshot: &UsageSnapshot, calendar: &CalendarConfig) -> String {
    let today = calendar.timezone.date_of(snapshot.updated_at);
    match period.period {
        UsagePeriod::Today => format!("{} ({})", period.period.title(), today.format("%Y-%m-%d")),
        UsagePeriod::Week => {
            let (_, week) = calendar.week_of_year(today);
            format!("{} (W{week:02})", period.period.title())
        }
        UsagePeriod::Month => format!("{} ({})", period.period.title(), today.format("%b %Y")),
    }
}

pub(crate) fn period_table(
    snapshot: &UsageSnapshot,
    calendar: &CalendarConfig,
    opts: &TableOptions,
) -> Table {
    let c = opts.use_color;
    let mut table = create_styled_table();

    if opts.compact {
        table.set_header(vec![
            header_cell("Period", c),
            header_cell("In", c),
            header_cell("Out", c),
            header_cell("Total", c),
            header_cell("Cost", c),
        ]);
    } else {
        table.set_header(vec![
            header_cell("Period", c),
            header_cell("Sessions", c),
            header_cell("Input", c),
            header_cell("Output", c),
            header_cell("Cache", c),
            header_cell("Total", c),
            header_cell("Cost", c),
        ]);
    }

    let cost_style = opts.emphasis(Color::Green, false);
    for period in &snapshot.periods {
        let m = &period.metrics;
        let mut row = vec![Cell::new(period_label(period, snapshot, calendar))];
        if opts.compact {
            row.extend([
                number_cell(&opts.tokens(m.input_tokens), Emphasis::PLAIN),
                number_cell(&opts.tokens(m.output_tokens), Emphasis::PLAIN),
            ]);
        } else {
            row.extend([
                number_cell(
                    &format_number(m.session_count as u64, opts.number_format),
                    Emphasis::PLAIN,
                ),
                number_cell(&opts.tokens(m.input_tokens), Emphasis::PLAIN),
                number_cell(&opts.tokens(m.output_tokens), Emphasis::PLAIN),
                number_cell(&opts.tokens(m.cache_tokens), Emphasis::PLAIN),
            ]);
        }
        row.extend([
            number_cell(&opts.tokens(m.total_tokens()), Emphasis::PLAIN),
            number_cell(&opts.cost(m.cost_usd), cost_style),
        ]);
        table.add_row(row);
    }
    table
}

pub(crate) fn model_table(models: &[ModelUsage], opts: &TableOptions) -> Table {
    let c = opts.use_color;
    let mut table = create_styled_table();
    if opts.compact {
        table.set_header(vec![
            header_cell("Model", c),
            header_cell("Total", c),
            header_cell("Cost", c),
        ]);
    } else {
        table.set_header(vec![
            header_cell("Model", c),
            header_cell("Input", c),
            header_cell("Output", c),
            header_cell("Cache", c),
            header_cell("Total", c),
            header_cell("Cost", c),
        ]);
    }

    let cost_style = opts.emphasis(Color::Green, false);
    let mut totals = ModelUsage {
        model_name: String::from("TOTAL"),
        input_tokens: 0,
        output_tokens: 0,
        cache_tokens: 0,
        cost_usd: Decimal::ZERO,
    };

    for model in models {
        totals.input_tokens = totals.input_tokens.saturating_add(model.input_tokens);
        totals.output_tokens = totals.output_tokens.saturating_add(model.output_tokens);
        totals.cache_tokens = totals.cache_tokens.saturating_add(model.cache_tokens);
        totals.cost_usd = totals.cost_usd.saturating_add(model.cost_usd);
        table.add_row(model_row(model, opts, Emphasis::PLAIN, cost_style));
    }

    table.add_row(model_row(
        &totals,
        opts,
        opts.emphasis(Color::Cyan, true),
        opts.emphasis(Color::Green, true),
    ));
    table
}

fn model_row(
    model: &ModelUsage,
    opts: &TableOptions,
    style: Emphasis,
    cost_style: Emphasis,
) -> Vec<Cell> {
    let mut row = vec![text_cell(&model.model_name, style)];
    if !opts.compact {
        row.extend([
            number_cell(&opts.tokens(model.input_tokens), style),
            number_cell(&opts.tokens(model.output_tokens), style),
            number_cell(&opts.tokens(model.cache_tokens), style),
        ]);
    }
    row.extend([
        number_cell(&opts.tokens(model.total_tokens()), style),
        number_cell(&opts.cost(model.cost_usd), cost_style),
    ]);
    row
}

pub(crate) fn session_table(
    sessions: &[SessionUsage],
    timezone: Timezone,
    opts: &TableOptions,
) -> Table {
    let c = opts.use_color;
    let mut table = create_styled_table();
    if opts.compact {
        table.set_header(vec![
            header_cell("Session", c),
            header_cell("Last Active", c),
            header_cell("Total", c),
            header_cell("Cost", c),
        ]);
    } else {
        table.set_header(vec![
            header_cell("Session", c),
            header_cell("Requests", c),
            header_cell("Last Active", c),
            header_cell("Input", c),
            header_cell("Output", c),
            header_cell("Cache", c),
            header_cell("Total", c),
            header_cell("Cost", c),
        ]);
    }

    let cost_style = opts.emphasis(Color::Green, false);
    for session in sessions {
        let last_active = timezone
            .to_fixed_offset(session.last_seen)
            .format("%H:%M")
            .to_string();

        let mut row = vec![Cell::new(&session.display_name)];
        if opts.compact {
            row.push(Cell::new(&last_active));
        } else {
            row.extend([
                number_cell(
                    &format_number(session.request_count as u64, opts.number_format),
                    Emphasis::PLAIN,
                ),
                Cell::new(&last_active),
                number_cell(&opts.tokens(session.input_tokens), Emphasis::PLAIN),
                number_cell(&opts.tokens(session.output_tokens), Emphasis::PLAIN),
                number_cell(&opts.tokens(session.cache_tokens), Emphasis::PLAIN),
            ]);
        }
        row.extend([
            number_cell(&opts.tokens(session.total_tokens()), Emphasis::PLAIN),
            number_cell(&opts.cost(session.cost_usd), cost_style),
        ]);
        table.add_row(row);
    }
    table
}

fn print_section(title: &str, table: &Table) {
    println!("\n  {title}\n");
    println!("{table}");
}

/// Period table followed by today's model and session breakdowns
pub(crate) fn print_summary(snapshot: &UsageSnapshot, calendar: &CalendarConfig, opts: &TableOptions) {
    print_section("Token Usage", &period_table(snapshot, calendar, opts));
    if !snapshot.model_breakdown_today.is_empty() {
        print_section("Models Today", &model_table(&snapshot.model_breakdown_today, opts));
    }
    if !snapshot.session_breakdown_today.is_empty() {
        print_section(
            "Sessions Today",
            &session_table(&snapshot.session_breakdown_today, calendar.timezone, opts),
        );
    }
    println!();
}

pub(crate) fn print_models(snapshot: &UsageSnapshot, opts: &TableOptions) {
    if snapshot.model_breakdown_today.is_empty() {
        println!("No model usage today.");
        return;
    }
    print_section("Models Today", &model_table(&snapshot.model_breakdown_today, opts));
    println!();
}

pub(crate) fn print_sessions(snapshot: &UsageSnapshot, timezone: Timezone, opts: &TableOptions) {
    if snapshot.session_breakdown_today.is_empty() {
        println!("No sessions today.");
        return;
    }
    print_section(
        "Sessions Today",
        &session_table(&snapshot.session_breakdown_today, timezone, opts),
    );
    println!(
        "\n  {} sessions\n",
        format_number(
            snapshot.session_breakdown_today.len() as u64,
            opts.number_format
        )
    );
}
