//! Display formatting shared by the binder and every renderer.
//!
//! Nothing here fails: unparseable input degrades to `PLACEHOLDER` so a partially filled
//! document still renders and the user can see what is left to complete.

use chrono::{DateTime, Datelike, NaiveDate};

/// Visible stand-in for a value that is missing or cannot be formatted.
pub const PLACEHOLDER: &str = "__________";

/// Accepted date layouts, tried in order after `MM/DD/YYYY`.
const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%B %d %Y", "%d %B %Y"];

// ────────────────────────────────────────────────────────────────────────────
// Money
// ────────────────────────────────────────────────────────────────────────────

/// Formats a numeric string with grouped thousands and no decimals: `"1100"` → `"1,100"`.
///
/// Tolerates a leading `$`, existing separators and surrounding whitespace.
pub fn format_money(raw: Option<&str>) -> String {
    let Some(amount) = raw.and_then(parse_amount) else {
        return PLACEHOLDER.to_string();
    };

    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

/// English ordinal suffix for a day of month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    }
}

/// Parses `MM/DD/YYYY` first, then the fallback layouts and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Some(date);
    }

    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Day, month name and year pulled out of a date string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    pub day: u32,
    pub month: String,
    pub year: i32,
}

impl DateParts {
    pub fn ordinal_day(&self) -> String {
        format!("{}{}", self.day, ordinal_suffix(self.day))
    }
}

pub fn date_parts(raw: Option<&str>) -> Option<DateParts> {
    let date = parse_date(raw?)?;
    Some(DateParts {
        day: date.day(),
        month: month_name(date),
        year: date.year(),
    })
}

fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// `"June 1st, 2024"`.
pub fn ordinal_date(raw: Option<&str>) -> String {
    match date_parts(raw) {
        Some(p) => format!("{} {}, {}", p.month, p.ordinal_day(), p.year),
        None => PLACEHOLDER.to_string(),
    }
}

/// `"June 1, 2024"`.
pub fn long_date(raw: Option<&str>) -> String {
    match date_parts(raw) {
        Some(p) => format!("{} {}, {}", p.month, p.day, p.year),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn day_of(raw: Option<&str>) -> String {
    date_parts(raw).map_or_else(|| PLACEHOLDER.to_string(), |p| p.ordinal_day())
}

pub fn month_of(raw: Option<&str>) -> String {
    date_parts(raw).map_or_else(|| PLACEHOLDER.to_string(), |p| p.month)
}

pub fn year_of(raw: Option<&str>) -> String {
    date_parts(raw).map_or_else(|| PLACEHOLDER.to_string(), |p| p.year.to_string())
}
