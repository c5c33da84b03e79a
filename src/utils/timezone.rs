use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::AppError;

/// Longest stretch of local time a DST transition can skip
const MAX_GAP_MINUTES: i64 = 180;

/// Zone used for calendar windows and displayed times
#[derive(Debug, Clone, Copy)]
pub(crate) enum Timezone {
    /// System zone, re-read for every conversion
    Local,
    Named(Tz),
}

impl Timezone {
    /// `None`, blank and `local` mean the system zone; `utc`/`z` are
    /// shorthands; anything else must be an IANA name.
    pub(crate) fn parse(value: Option<&str>) -> Result<Self, AppError> {
        let name = value.map(str::trim).unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "" | "local" => Ok(Timezone::Local),
            "utc" | "z" => Ok(Timezone::Named(chrono_tz::UTC)),
            _ => Tz::from_str(name)
                .map(Timezone::Named)
                .map_err(|_| AppError::InvalidTimezone {
                    input: name.to_string(),
                }),
        }
    }

    pub(crate) fn to_fixed_offset(self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Timezone::Local => fixed_in(&Local, utc),
            Timezone::Named(tz) => fixed_in(&tz, utc),
        }
    }

    /// Calendar date of an instant in this zone
    pub(crate) fn date_of(self, utc: DateTime<Utc>) -> NaiveDate {
        self.to_fixed_offset(utc).date_naive()
    }

    /// First instant of `date` in this zone.
    ///
    /// When local midnight falls into a DST gap the first valid local time
    /// after it is used; `None` only if no valid time exists within the gap
    /// limit.
    pub(crate) fn start_of_date(self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        match self {
            Timezone::Local => first_valid_local(&Local, midnight),
            Timezone::Named(tz) => first_valid_local(&tz, midnight),
        }
    }
}

fn fixed_in<T: TimeZone>(tz: &T, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
    utc.with_timezone(tz).fixed_offset()
}

fn first_valid_local<T: TimeZone>(tz: &T, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    (0..=MAX_GAP_MINUTES / 15).find_map(|step| {
        let candidate = naive + Duration::minutes(step * 15);
        tz.from_local_datetime(&candidate)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}
