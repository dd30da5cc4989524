//! Date dimension generation.
//!
//! Calendar rows are pure functions of the date and the season table, so
//! generation needs no storage access and yields identical rows on every call.

use std::iter::FusedIterator;

use chrono::{Datelike, Days, Month, NaiveDate, Weekday};

use crate::{
    model::calendar::{CalendarRow, SeasonTable},
    util::time::date_key,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DateDimensionGenerator {
    seasons: SeasonTable,
}

impl DateDimensionGenerator {
    pub fn new(seasons: SeasonTable) -> Self {
        Self { seasons }
    }

    /// Lazily yields one row per day in `start..=end`; empty when `end < start`.
    pub fn generate_range(&self, start: NaiveDate, end: NaiveDate) -> CalendarDays {
        let remaining = if end < start {
            0
        } else {
            (end - start).num_days() as usize + 1
        };

        CalendarDays {
            next: start,
            remaining,
            seasons: self.seasons,
        }
    }

    /// Builds the calendar row for a single date.
    pub fn row(&self, date: NaiveDate) -> CalendarRow {
        calendar_row(date, self.seasons)
    }
}

/// Restartable iterator over consecutive calendar days.
#[derive(Debug, Clone)]
pub struct CalendarDays {
    next: NaiveDate,
    remaining: usize,
    seasons: SeasonTable,
}

impl Iterator for CalendarDays {
    type Item = CalendarRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let date = self.next;
        self.remaining -= 1;
        if self.remaining > 0 {
            match date.checked_add_days(Days::new(1)) {
                Some(next) => self.next = next,
                None => self.remaining = 0,
            }
        }

        Some(calendar_row(date, self.seasons))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CalendarDays {}

impl FusedIterator for CalendarDays {}

fn calendar_row(date: NaiveDate, seasons: SeasonTable) -> CalendarRow {
    let month = date.month();
    let weekday = date.weekday();
    let (fiscal_quarter, fiscal_year) = fiscal_period(date);
    let month_enum = Month::try_from(month as u8).unwrap_or(Month::January);

    CalendarRow {
        date_key: date_key(date),
        full_date: date,
        day_of_week: weekday.number_from_monday(),
        day_name: date.format("%A").to_string(),
        day_of_month: date.day(),
        day_of_year: date.ordinal(),
        week_of_year: date.iso_week().week(),
        month,
        month_name: month_enum.name().to_string(),
        quarter: (month - 1) / 3 + 1,
        year: date.year(),
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        is_holiday: false,
        season: seasons.season(month_enum).to_string(),
        fiscal_quarter,
        fiscal_year,
    }
}

/// Fiscal year starts in April and is named after the calendar year it ends in.
fn fiscal_period(date: NaiveDate) -> (u32, i32) {
    match date.month() {
        1..=3 => (4, date.year()),
        4..=6 => (1, date.year() + 1),
        7..=9 => (2, date.year() + 1),
        _ => (3, date.year() + 1),
    }
}
