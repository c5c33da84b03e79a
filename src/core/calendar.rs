//! Calendar windows for period aggregation
//!
//! Today, this week and this month as half-open UTC intervals, computed in the
//! caller's time zone with a configurable first weekday.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};

use crate::utils::Timezone;

/// Half-open interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
}

impl Window {
    pub(crate) fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Windows {
    pub(crate) today: Window,
    pub(crate) week: Window,
    pub(crate) month: Window,
}

/// Week and time-zone conventions used to cut windows
#[derive(Debug, Clone, Copy)]
pub(crate) struct CalendarConfig {
    pub(crate) timezone: Timezone,
    pub(crate) first_weekday: Weekday,
    /// Only affects week numbering, never window boundaries
    pub(crate) min_days_in_first_week: u8,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            timezone: Timezone::Local,
            first_weekday: Weekday::Mon,
            min_days_in_first_week: 4,
        }
    }
}

impl CalendarConfig {
    pub(crate) fn windows(&self, now: DateTime<Utc>) -> Windows {
        let today = self.timezone.date_of(now);

        let today_window = self
            .span(today, today.checked_add_days(Days::new(1)))
            .unwrap_or_else(|| utc_day(now));

        let week_start = self.week_start(today);
        let week = self
            .span(week_start, week_start.checked_add_days(Days::new(7)))
            .unwrap_or(today_window);

        let month = first_of_month(today)
            .and_then(|start| self.span(start, next_month(start)))
            .unwrap_or(today_window);

        Windows {
            today: today_window,
            week,
            month,
        }
    }

    /// First day of the week containing `date`
    pub(crate) fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let offset = days_from(date.weekday(), self.first_weekday);
        date - Days::new(u64::from(offset))
    }

    /// `(year, week)` under this calendar's first-weekday and
    /// minimum-days-in-first-week rules
    pub(crate) fn week_of_year(&self, date: NaiveDate) -> (i32, u32) {
        let year = date.year();
        let Some(this_first) = self.first_week_start(year) else {
            return (year, 1);
        };

        if date < this_first {
            let Some(prev_first) = self.first_week_start(year - 1) else {
                return (year, 1);
            };
            return (year - 1, weeks_between(prev_first, date) + 1);
        }

        if let Some(next_first) = self.first_week_start(year + 1)
            && date >= next_first
        {
            return (year + 1, 1);
        }

        (year, weeks_between(this_first, date) + 1)
    }

    fn first_week_start(&self, year: i32) -> Option<NaiveDate> {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let start = self.week_start(jan1);
        let days_in_year = 7 - days_from(jan1.weekday(), self.first_weekday);
        let min_days = u32::from(self.min_days_in_first_week.clamp(1, 7));
        if days_in_year >= min_days {
            Some(start)
        } else {
            start.checked_add_days(Days::new(7))
        }
    }

    fn span(&self, start: NaiveDate, end: Option<NaiveDate>) -> Option<Window> {
        let start = self.timezone.start_of_date(start)?;
        let end = self.timezone.start_of_date(end?)?;
        Some(Window { start, end })
    }
}

fn days_from(day: Weekday, first: Weekday) -> u32 {
    (day.num_days_from_monday() + 7 - first.num_days_from_monday()) % 7
}

fn weeks_between(start: NaiveDate, date: NaiveDate) -> u32 {
    ((date - start).num_days() / 7) as u32
}

fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

fn next_month(first: NaiveDate) -> Option<NaiveDate> {
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
}

fn utc_day(now: DateTime<Utc>) -> Window {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);
    Window {
        start,
        end: start + chrono::Duration::days(1),
    }
}
