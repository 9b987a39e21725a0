//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Formats an integer amount as taka.
///
/// Usage in templates: `{{ total|taka }}`
#[askama::filter_fn]
pub fn taka(amount: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("৳ {amount}"))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
