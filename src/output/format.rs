use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, TableComponent,
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::AppError;

/// Language -> (group separator, decimal separator)
const LOCALE_SEPARATORS: &[(&str, char, char)] = &[
    ("en", ',', '.'),
    ("zh", ',', '.'),
    ("ja", ',', '.'),
    ("de", '.', ','),
    ("pl", ' ', ','),
    ("fr", ' ', ','),
    ("ru", ' ', ','),
];

const COMPACT_UNITS: [(u64, char); 3] = [(1_000_000_000, 'B'), (1_000_000, 'M'), (1_000, 'K')];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberFormat {
    group_sep: char,
    decimal_sep: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            group_sep: ',',
            decimal_sep: '.',
        }
    }
}

impl NumberFormat {
    /// Separators for a locale tag such as `de`, `fr-CA` or `pl_PL`
    pub(crate) fn from_locale(locale: Option<&str>) -> Result<Self, AppError> {
        let tag = locale.map(str::trim).unwrap_or_default();
        if tag.is_empty() {
            return Ok(NumberFormat::default());
        }
        let language = tag.split(['-', '_']).next().unwrap_or(tag);

        LOCALE_SEPARATORS
            .iter()
            .find(|(lang, _, _)| lang.eq_ignore_ascii_case(language))
            .map(|&(_, group_sep, decimal_sep)| NumberFormat {
                group_sep,
                decimal_sep,
            })
            .ok_or_else(|| AppError::UnsupportedLocale {
                input: tag.to_string(),
            })
    }
}

pub(super) fn format_number(n: u64, format: NumberFormat) -> String {
    group_digits(&n.to_string(), format)
}

fn group_digits(digits: &str, format: NumberFormat) -> String {
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(format.group_sep);
        }
        out.push(ch);
    }
    out
}

/// Token count with a K/M/B suffix and one decimal
pub(super) fn format_compact(n: u64, format: NumberFormat) -> String {
    let Some(&(unit, suffix)) = COMPACT_UNITS.iter().find(|(unit, _)| n >= *unit) else {
        return n.to_string();
    };
    let scaled = format!("{:.1}", n as f64 / unit as f64);
    let scaled = scaled.replace('.', &format.decimal_sep.to_string());
    format!("{scaled}{suffix}")
}

/// Dollar amount rounded half-up to cents
pub(super) fn format_cost(cost: Decimal, format: NumberFormat) -> String {
    let rounded = cost
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let dollars = rounded.trunc();
    let cents = ((rounded - dollars) * Decimal::ONE_HUNDRED)
        .to_u64()
        .unwrap_or(0);
    format!(
        "${}{}{:02}",
        group_digits(&dollars.normalize().to_string(), format),
        format.decimal_sep,
        cents
    )
}

/// Color and weight applied to a body cell
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Emphasis {
    pub(super) color: Option<Color>,
    pub(super) bold: bool,
}

impl Emphasis {
    pub(super) const PLAIN: Emphasis = Emphasis {
        color: None,
        bold: false,
    };

    fn apply(self, mut cell: Cell) -> Cell {
        if let Some(color) = self.color {
            cell = cell.fg(color);
        }
        if self.bold {
            cell = cell.add_attribute(Attribute::Bold);
        }
        cell
    }
}

pub(super) fn text_cell(text: &str, emphasis: Emphasis) -> Cell {
    emphasis.apply(Cell::new(text))
}

/// Right-aligned cell for counts and costs
pub(super) fn number_cell(text: &str, emphasis: Emphasis) -> Cell {
    emphasis.apply(Cell::new(text).set_alignment(CellAlignment::Right))
}

pub(super) fn header_cell(text: &str, use_color: bool) -> Cell {
    Emphasis {
        color: use_color.then_some(Color::Cyan),
        bold: true,
    }
    .apply(Cell::new(text))
}

/// UTF-8 table with inner borders and a single-line header separator
pub(super) fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(TableComponent::HeaderLines, '─')
        .set_style(TableComponent::LeftHeaderIntersection, '├')
        .set_style(TableComponent::MiddleHeaderIntersections, '┼')
        .set_style(TableComponent::RightHeaderIntersection, '┤');
    table
}
