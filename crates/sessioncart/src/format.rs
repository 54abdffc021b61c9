use crate::config::NumberFormat;
use rust_decimal::{Decimal, RoundingStrategy};

/// Render a decimal for display with fixed fractional digits, a custom
/// decimal point, and thousands grouping.
///
/// Rounding is half-away-from-zero and happens only here; accumulation
/// elsewhere in the crate always runs at full precision.
#[must_use]
pub fn number_format(value: Decimal, format: &NumberFormat) -> String {
    let rounded =
        value.round_dp_with_strategy(format.decimals, RoundingStrategy::MidpointAwayFromZero);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.*}", format.decimals as usize, rounded.abs());

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part, &format.thousand_separator));

    if let Some(frac) = frac_part {
        out.push_str(&format.decimal_point);
        out.push_str(frac);
    }

    out
}

// Insert the separator every three digits counting from the right.
fn group_thousands(digits: &str, separator: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() * 2);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(ch);
    }

    grouped
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("valid decimal")
    }

    fn fmt(s: &str) -> String {
        number_format(dec(s), &NumberFormat::default())
    }

    #[test]
    fn pads_to_fixed_fraction_digits() {
        assert_eq!(fmt("10"), "10.00");
        assert_eq!(fmt("10.5"), "10.50");
        assert_eq!(fmt("0"), "0.00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(fmt("2.675"), "2.68");
        assert_eq!(fmt("-2.675"), "-2.68");
        assert_eq!(fmt("1.004"), "1.00");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(fmt("1234567.891"), "1,234,567.89");
        assert_eq!(fmt("1000"), "1,000.00");
        assert_eq!(fmt("999"), "999.00");
    }

    #[test]
    fn honours_custom_separators_and_zero_decimals() {
        let format = NumberFormat {
            decimals: 0,
            decimal_point: ",".to_string(),
            thousand_separator: ".".to_string(),
        };
        assert_eq!(number_format(dec("1234567.4"), &format), "1.234.567");

        let format = NumberFormat {
            decimals: 2,
            decimal_point: ",".to_string(),
            thousand_separator: " ".to_string(),
        };
        assert_eq!(number_format(dec("1234.5"), &format), "1 234,50");
    }

    #[test]
    fn negative_values_keep_sign_outside_grouping() {
        assert_eq!(fmt("-1234.5"), "-1,234.50");
        assert_eq!(fmt("-0.001"), "0.00");
    }
}
