//! Total parsing and fixed-point integer helpers.
//!
//! RULE: No floating point anywhere in the money path.
//! Every helper here is total: bad input maps to a fallback value,
//! never to an error, so callers never branch on parse failure.

/// Parse a trimmed integer. Empty or non-numeric input yields 0.
pub fn parse_int(value: &str) -> i64 {
    value.trim().parse::<i64>().unwrap_or(0)
}

/// Clamp `value` into `[low, high]`.
pub fn clamp(value: i64, low: i64, high: i64) -> i64 {
    value.max(low).min(high)
}

/// Integer division rounding half-up.
///
/// Only defined for `numerator > 0` and `denominator > 0`; anything else
/// returns 0. Negative numerators are NOT rounded toward anything, they
/// collapse to 0.
pub fn round_div(numerator: i64, denominator: i64) -> i64 {
    if denominator <= 0 || numerator <= 0 {
        return 0;
    }
    numerator.saturating_add(denominator / 2) / denominator
}

/// `value * bps / 10_000`, rounded half-up.
pub fn apply_bps(value: i64, bps: i64) -> i64 {
    round_div(value.saturating_mul(bps), 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_div_boundaries() {
        assert_eq!(round_div(5, 2), 3);
        assert_eq!(round_div(4, 2), 2);
        assert_eq!(round_div(0, 5), 0);
        assert_eq!(round_div(5, 0), 0);
        assert_eq!(round_div(-7, 2), 0);
        assert_eq!(round_div(7, -2), 0);
        assert_eq!(round_div(14_999, 10_000), 1);
        assert_eq!(round_div(15_000, 10_000), 2);
    }

    #[test]
    fn round_div_matches_floor_formula() {
        for n in 1..200i64 {
            for d in 1..40i64 {
                assert_eq!(round_div(n, d), (n + d / 2) / d, "n={n} d={d}");
            }
        }
    }

    #[test]
    fn round_div_saturates_instead_of_overflowing() {
        assert_eq!(round_div(i64::MAX, 1), i64::MAX);
    }

    #[test]
    fn parse_int_defaults_to_zero() {
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("bad"), 0);
        assert_eq!(parse_int("12.5"), 0);
        assert_eq!(parse_int("  42 "), 42);
        assert_eq!(parse_int("-3"), -3);
        assert_eq!(parse_int("+7"), 7);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(-1, 0, 5000), 0);
        assert_eq!(clamp(6000, 0, 5000), 5000);
        assert_eq!(clamp(250, 0, 5000), 250);
    }
}
