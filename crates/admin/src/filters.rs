//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Format an optional storage size for table cells.
///
/// Usage in templates: `{{ row.storage|storage_gb }}`
#[askama::filter_fn]
pub fn storage_gb(value: &Option<u32>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_storage(*value))
}

fn format_storage(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |gb| format!("{gb} GB"))
}

#[cfg(test)]
mod tests {
    use super::format_storage;

    #[test]
    fn test_format_storage() {
        assert_eq!(format_storage(Some(256)), "256 GB");
        assert_eq!(format_storage(None), "-");
    }
}
