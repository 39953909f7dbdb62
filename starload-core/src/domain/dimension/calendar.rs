// starload-core/src/domain/dimension/calendar.rs
//
// Synthetic date dimension; independent of any source data.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::table::Conformed;
use crate::domain::value::Value;

pub const ENTITY: &str = "date";

/// Inclusive calendar range covered by `dim_date`.
pub fn default_range() -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(2005, 1, 1)?,
        NaiveDate::from_ymd_opt(2014, 12, 31)?,
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRow {
    pub full_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// ISO weekday, Monday = 1 .. Sunday = 7.
    pub weekday: u32,
    pub quarter: u32,
    pub day_of_year: u32,
    pub week_of_year: u32,
    pub month_name: String,
    pub day_name: String,
    pub is_weekend: bool,
    pub is_month_end: bool,
    pub is_quarter_end: bool,
    pub is_year_end: bool,
    pub fiscal_quarter: u32,
    pub fiscal_year: i32,
    pub saved_date: NaiveDate,
}

impl DateRow {
    pub fn for_day(date: NaiveDate, today: NaiveDate) -> Self {
        let quarter = (date.month() - 1) / 3 + 1;
        let next = date.succ_opt();
        let is_month_end = next.is_none_or(|n| n.month() != date.month());
        let weekday = date.weekday();

        DateRow {
            full_date: date,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            weekday: weekday.number_from_monday(),
            quarter,
            day_of_year: date.ordinal(),
            week_of_year: date.iso_week().week(),
            month_name: date.format("%B").to_string(),
            day_name: date.format("%A").to_string(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            is_month_end,
            is_quarter_end: is_month_end && date.month() % 3 == 0,
            is_year_end: date.month() == 12 && date.day() == 31,
            fiscal_quarter: quarter,
            fiscal_year: date.year(),
            saved_date: today,
        }
    }
}

impl Conformed for DateRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("full_date", self.full_date.into()),
            ("year", self.year.into()),
            ("month", self.month.into()),
            ("day", self.day.into()),
            ("weekday", self.weekday.into()),
            ("quarter", self.quarter.into()),
            ("day_of_year", self.day_of_year.into()),
            ("week_of_year", self.week_of_year.into()),
            ("month_name", self.month_name.into()),
            ("day_name", self.day_name.into()),
            ("is_weekend", self.is_weekend.into()),
            ("is_month_end", self.is_month_end.into()),
            ("is_quarter_end", self.is_quarter_end.into()),
            ("is_year_end", self.is_year_end.into()),
            ("fiscal_quarter", self.fiscal_quarter.into()),
            ("fiscal_year", self.fiscal_year.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

/// One row per calendar day in `[start, end]`.
pub fn build_range(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Vec<DateRow> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| DateRow::for_day(d, today))
        .collect()
}

pub fn build(today: NaiveDate) -> Vec<DateRow> {
    default_range()
        .map(|(start, end)| build_range(start, end, today))
        .unwrap_or_default()
}
