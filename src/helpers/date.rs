//! Date helper functions

use chrono::{DateTime, Datelike, Utc};

const MONTHS_SQ: [&str; 12] = [
    "janar", "shkurt", "mars", "prill", "maj", "qershor", "korrik", "gusht", "shtator", "tetor",
    "nëntor", "dhjetor",
];

const MONTHS_SQ_SHORT: [&str; 12] = [
    "jan", "shk", "mar", "pri", "maj", "qer", "korr", "gush", "sht", "tet", "nën", "dhj",
];

/// How much of a date to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// Day, full month name and year
    Long,
    /// Day and abbreviated month
    Short,
    /// Digits only
    Numeric,
}

/// Format a date for display in the given language
///
/// # Examples
/// ```ignore
/// format_date(&date, "sq", DateStyle::Long) // -> "4 mars 2025"
/// format_date(&date, "en", DateStyle::Long) // -> "March 4, 2025"
/// ```
pub fn format_date(date: &DateTime<Utc>, language: &str, style: DateStyle) -> String {
    let month = date.month0() as usize;
    match (language, style) {
        ("sq", DateStyle::Long) => format!("{} {} {}", date.day(), MONTHS_SQ[month], date.year()),
        ("sq", DateStyle::Short) => format!("{} {}", date.day(), MONTHS_SQ_SHORT[month]),
        ("sq", DateStyle::Numeric) => format!("{}.{}.{}", date.day(), date.month(), date.year()),
        (_, DateStyle::Long) => date.format("%B %-d, %Y").to_string(),
        (_, DateStyle::Short) => date.format("%b %-d").to_string(),
        (_, DateStyle::Numeric) => date.format("%-m/%-d/%Y").to_string(),
    }
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
