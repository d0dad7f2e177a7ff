//! Amount validation boundary.
//!
//! Runs before any query mutation: a rejected amount never reaches the query
//! editor. Accepted amounts are normalized to the fixed two-decimal form the
//! `am` parameter requires.

use crate::error::AmountError;

/// Validate a user-entered amount and normalize it to exactly two decimals
/// (`"250"` → `"250.00"`). Rejects empty, non-numeric, non-finite, zero and
/// negative input.
pub fn normalize_amount(input: &str) -> Result<String, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    let value: f64 = trimmed.parse().map_err(|_| AmountError::NotANumber)?;
    if !value.is_finite() {
        return Err(AmountError::NotANumber);
    }
    if value <= 0.0 {
        return Err(AmountError::NotPositive);
    }
    Ok(format!("{value:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_number_gains_decimals() {
        assert_eq!(normalize_amount("250").unwrap(), "250.00");
    }

    #[test]
    fn test_one_decimal_is_padded() {
        assert_eq!(normalize_amount("0.5").unwrap(), "0.50");
    }

    #[test]
    fn test_extra_decimals_are_rounded() {
        assert_eq!(normalize_amount("10.999").unwrap(), "11.00");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(normalize_amount("  42.10 ").unwrap(), "42.10");
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_eq!(normalize_amount(""), Err(AmountError::Empty));
        assert_eq!(normalize_amount("   "), Err(AmountError::Empty));
    }

    #[test]
    fn test_zero_and_negative_are_rejected() {
        assert_eq!(normalize_amount("0"), Err(AmountError::NotPositive));
        assert_eq!(normalize_amount("0.00"), Err(AmountError::NotPositive));
        assert_eq!(normalize_amount("-5"), Err(AmountError::NotPositive));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(normalize_amount("abc"), Err(AmountError::NotANumber));
        assert_eq!(normalize_amount("12abc"), Err(AmountError::NotANumber));
        assert_eq!(normalize_amount("1,000"), Err(AmountError::NotANumber));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        assert_eq!(normalize_amount("inf"), Err(AmountError::NotANumber));
        assert_eq!(normalize_amount("NaN"), Err(AmountError::NotANumber));
    }
}
