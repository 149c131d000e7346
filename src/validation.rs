// Input validation for ledger operations

use chrono::NaiveDate;
use serde_json::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Strict `YYYY-MM-DD`: zero-padded, and a real calendar day.
///
/// Stored dates are compared as text in range queries, so "2024-1-5" is
/// rejected even though it names a valid day.
pub fn validate_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 {
        return false;
    }

    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });

    shape_ok && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

/// Amounts must be finite and non-negative
pub fn validate_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

/// Coerce a raw JSON argument into an amount.
///
/// Numbers and numeric strings are accepted; anything else yields `None`.
/// Sign is not checked here, see [`validate_amount`].
pub fn amount_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_dates() {
        assert!(validate_date("2024-01-01"));
        assert!(validate_date("2024-02-29")); // leap year
        assert!(validate_date("1999-12-31"));
    }

    #[test]
    fn test_invalid_dates() {
        assert!(!validate_date("2024/01/01"));
        assert!(!validate_date("Jan 1 2024"));
        assert!(!validate_date("2024-1-01"));
        assert!(!validate_date("2024-01-1"));
        assert!(!validate_date("2023-02-29"));
        assert!(!validate_date("2024-13-01"));
        assert!(!validate_date("2024-00-10"));
        assert!(!validate_date(""));
        assert!(!validate_date("2024-01-01T00:00:00"));
        assert!(!validate_date(" 2024-01-01"));
    }

    #[test]
    fn test_amount_bounds() {
        assert!(validate_amount(0.0));
        assert!(validate_amount(10.5));
        assert!(!validate_amount(-0.01));
        assert!(!validate_amount(f64::NAN));
        assert!(!validate_amount(f64::INFINITY));
    }

    #[test]
    fn test_amount_from_json() {
        assert_eq!(amount_from_json(&json!(10)), Some(10.0));
        assert_eq!(amount_from_json(&json!(2.5)), Some(2.5));
        assert_eq!(amount_from_json(&json!("12.75")), Some(12.75));
        assert_eq!(amount_from_json(&json!(-3)), Some(-3.0));
        assert_eq!(amount_from_json(&json!("abc")), None);
        assert_eq!(amount_from_json(&json!(true)), None);
        assert_eq!(amount_from_json(&json!(null)), None);
        assert_eq!(amount_from_json(&json!([1])), None);
    }
}
