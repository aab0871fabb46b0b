use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::types::CellValue;

/// Spreadsheet date epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateSystem {
    /// Serial 1 is 1900-01-01, with the phantom 1900-02-29 at serial 60
    #[default]
    Excel1900,
    /// Serial 0 is 1904-01-01
    Excel1904,
}

/// Convert a serial date into a calendar date-time.
///
/// Returns `None` for time-only values (serial below 1), the phantom
/// 1900-02-29 and out-of-range serials.
pub fn serial_to_datetime(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let days = serial.floor() as i64;
    let epoch = match system {
        DateSystem::Excel1900 if days == 60 => return None,
        // Serials before the phantom leap day are one day ahead of the 1899-12-30 epoch
        DateSystem::Excel1900 if days < 60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        DateSystem::Excel1900 => NaiveDate::from_ymd_opt(1899, 12, 30)?,
        DateSystem::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
    };
    let date = epoch.checked_add_signed(Duration::try_days(days)?)?;

    let total_seconds = (serial.fract() * 86400.0).round() as u32;
    if total_seconds >= 86400 {
        return date.succ_opt().map(|d| d.and_time(NaiveTime::MIN));
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(total_seconds, 0)?;

    Some(NaiveDateTime::new(date, time))
}

/// Convert a serial into a `Date` or `DateTime` cell, keeping the raw
/// number when the serial has no calendar meaning
pub fn serial_to_value(serial: f64, system: DateSystem) -> CellValue {
    match serial_to_datetime(serial, system) {
        Some(dt) if dt.time() == NaiveTime::MIN => CellValue::Date(dt.date()),
        Some(dt) => CellValue::DateTime(dt),
        None => CellValue::Number(serial),
    }
}

/// Convert a date-time into a 1900-system serial
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    let mut days = (dt.date() - epoch).num_days() as f64;
    // Dates before 1900-03-01 sit below the phantom leap day
    if days < 61.0 {
        days -= 1.0;
    }
    let seconds = dt.time().num_seconds_from_midnight() as f64;
    days + seconds / 86400.0
}

/// Heuristic check for number format codes that display dates or times
pub fn is_date_format(code: &str) -> bool {
    let lower = code.to_ascii_lowercase();
    if lower == "general" || lower.is_empty() {
        return false;
    }

    // Strip quoted literals and bracketed sections such as colors and locales
    let mut stripped = String::with_capacity(lower.len());
    let mut in_quote = false;
    let mut in_bracket = false;
    let mut escaped = false;
    for c in lower.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            _ if in_quote || in_bracket => {}
            _ => stripped.push(c),
        }
    }

    stripped
        .chars()
        .any(|c| matches!(c, 'd' | 'm' | 'y' | 'h' | 's'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_1900_system() {
        let dt = serial_to_datetime(45306.0, DateSystem::Excel1900).unwrap();
        assert_eq!(dt.date(), ymd(2024, 1, 15));

        let dt = serial_to_datetime(1.0, DateSystem::Excel1900).unwrap();
        assert_eq!(dt.date(), ymd(1900, 1, 1));

        let dt = serial_to_datetime(61.0, DateSystem::Excel1900).unwrap();
        assert_eq!(dt.date(), ymd(1900, 3, 1));
    }

    #[test]
    fn test_1904_system() {
        let dt = serial_to_datetime(43844.0, DateSystem::Excel1904).unwrap();
        assert_eq!(dt.date(), ymd(2024, 1, 15));
    }

    #[test]
    fn test_phantom_leap_day_and_time_only() {
        assert!(serial_to_datetime(60.0, DateSystem::Excel1900).is_none());
        assert!(serial_to_datetime(0.5, DateSystem::Excel1900).is_none());
        assert_eq!(serial_to_value(0.5, DateSystem::Excel1900), CellValue::Number(0.5));
    }

    #[test]
    fn test_time_fraction() {
        let value = serial_to_value(45306.75, DateSystem::Excel1900);
        let expected = ymd(2024, 1, 15).and_hms_opt(18, 0, 0).unwrap();
        assert_eq!(value, CellValue::DateTime(expected));
    }

    #[test]
    fn test_serial_round_trip() {
        let dt = ymd(2024, 1, 15).and_hms_opt(12, 0, 0).unwrap();
        let serial = datetime_to_serial(dt);
        assert!((serial - 45306.5).abs() < 1e-9);
        assert_eq!(serial_to_datetime(serial, DateSystem::Excel1900), Some(dt));
    }

    #[test]
    fn test_is_date_format() {
        assert!(is_date_format("yyyy-mm-dd"));
        assert!(is_date_format("m/d/yy h:mm"));
        assert!(is_date_format("[$-409]mmmm d, yyyy"));
        assert!(!is_date_format("General"));
        assert!(!is_date_format("0.00"));
        assert!(!is_date_format("#,##0"));
        assert!(!is_date_format("[Red]0.00"));
        assert!(!is_date_format("0.0 \"days\""));
    }
}
