use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;
use crate::utils::Timezone;

/// Parse `--now`: an RFC 3339 instant, or a date meaning its local midnight
pub(crate) fn parse_instant(s: &str, timezone: Timezone) -> Result<DateTime<Utc>, AppError> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Try YYYYMMDD
    if trimmed.len() == 8
        && let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        && let Some(start) = timezone.start_of_date(d)
    {
        return Ok(start);
    }
    // Try YYYY-MM-DD
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        && let Some(start) = timezone.start_of_date(d)
    {
        return Ok(start);
    }
    Err(AppError::InvalidDate {
        input: s.to_string(),
    })
}
