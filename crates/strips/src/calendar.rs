//! Weekday calendar. Saturdays and Sundays are the only non-business days;
//! exchange holidays are not modelled and show up as days without a curve.

use chrono::{Datelike, NaiveDate, Weekday};

use common::{Error, Result};

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidDate(format!("'{s}': {e}")))
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Move `n` business days forward (`n > 0`) or back (`n < 0`).
/// `n == 0` returns `date` unchanged, even on a weekend.
pub fn add_business_days(date: NaiveDate, n: i64) -> Result<NaiveDate> {
    let mut current = date;
    let mut remaining = n.unsigned_abs();
    while remaining > 0 {
        let step = if n > 0 { current.succ_opt() } else { current.pred_opt() };
        current = step.ok_or_else(|| {
            Error::InvalidDate(format!("{date} shifted by {n} business days is out of range"))
        })?;
        if is_business_day(current) {
            remaining -= 1;
        }
    }
    Ok(current)
}

/// Business days in `[start, end]`, oldest first. Empty when `start > end`.
pub fn business_dates(start: NaiveDate, end: NaiveDate) -> BusinessDates {
    BusinessDates {
        next: Some(start),
        end,
    }
}

/// Lazy iterator returned by [`business_dates`]. A clone resumes from the
/// same position.
#[derive(Debug, Clone)]
pub struct BusinessDates {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for BusinessDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            let day = self.next?;
            if day > self.end {
                self.next = None;
                return None;
            }
            self.next = day.succ_opt();
            if is_business_day(day) {
                return Some(day);
            }
        }
    }
}
