//! Number formatting for currency and percentage labels.
//!
//! The dashboard's labels are produced both here and by the JavaScript
//! formatters embedded in the chart options, so the functions in this module
//! follow the browser's number formatting rules exactly: `toFixed` rounding,
//! `Math.round` and number to string conversion.

/// The largest number of fractional digits in the exact decimal expansion of
/// an `f64` (reached by the smallest subnormal).
const MAX_FRACTION_DIGITS: usize = 1074;

/// Formats `value` as dollars with two decimal places, e.g. `"$9.00"`.
///
/// Negative values keep their sign after the dollar sign (`"$-5.00"`) and
/// non-finite values are printed as-is (`"$NaN"`, `"$Infinity"`).
pub fn format_currency(value: f64) -> String {
    format!("${}", to_fixed(value, 2))
}

/// Formats `value` as a percentage with one decimal place, e.g. `"12.3%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{}%", to_fixed(value, 1))
}

/// Formats `value` with exactly `digits` fractional digits.
///
/// Matches JavaScript's `Number.prototype.toFixed`: when the exact binary
/// value lies precisely halfway between two candidates the larger magnitude
/// wins, so `to_fixed(0.125, 2)` is `"0.13"` while `to_fixed(1.005, 2)` is
/// `"1.00"` because 1.005 is stored as 1.00499999...
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }

    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    let magnitude = value.abs();
    let magnitude = if is_exact_tie(magnitude, digits) {
        // Rust rounds exact ties to even, nudge past the midpoint instead.
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };

    let formatted = format!("{:.*}", digits, magnitude);

    // -0.0 is not less than zero, so it prints without a sign like JavaScript.
    if value < 0.0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Whether the exact decimal expansion of `magnitude` has a 5 at fractional
/// position `digits` followed only by zeros.
fn is_exact_tie(magnitude: f64, digits: usize) -> bool {
    if digits >= MAX_FRACTION_DIGITS {
        return false;
    }

    let exact = format!("{:.*}", MAX_FRACTION_DIGITS, magnitude);
    let Some((_, fraction)) = exact.split_once('.') else {
        return false;
    };
    let fraction = fraction.as_bytes();

    fraction[digits] == b'5' && fraction[digits + 1..].iter().all(|&digit| digit == b'0')
}

/// Converts `value` to a string the way JavaScript does when a number is
/// concatenated with a string, e.g. `50` -> `"50"`, `NaN` -> `"NaN"`.
pub fn js_number_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }

    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    if value == 0.0 {
        return "0".to_owned();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        format!("{value}")
    } else {
        let scientific = format!("{value:e}");
        match scientific.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => scientific,
        }
    }
}

/// Rounds to the nearest integer with halves going towards positive
/// infinity, like JavaScript's `Math.round` (`-2.5` rounds to `-2`).
pub fn js_round(value: f64) -> f64 {
    let floor = value.floor();

    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_dollars_with_cents() {
        assert_eq!(format_currency(9.0), "$9.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234.5), "$1234.50");
    }

    #[test]
    fn currency_rounds_to_two_decimals() {
        assert_eq!(format_currency(9.999), "$10.00");
        assert_eq!(format_currency(12.344), "$12.34");
    }

    #[test]
    fn negative_currency_keeps_sign_after_dollar() {
        assert_eq!(format_currency(-20.0), "$-20.00");
        assert_eq!(format_currency(-0.001), "$-0.00");
        assert_eq!(format_currency(-0.0), "$0.00");
    }

    #[test]
    fn non_finite_currency_is_printed_verbatim() {
        assert_eq!(format_currency(f64::NAN), "$NaN");
        assert_eq!(format_currency(f64::INFINITY), "$Infinity");
        assert_eq!(format_currency(f64::NEG_INFINITY), "$-Infinity");
    }

    #[test]
    fn formats_percentage_with_one_decimal() {
        assert_eq!(format_percentage(12.34), "12.3%");
        assert_eq!(format_percentage(50.0), "50.0%");
        assert_eq!(format_percentage(f64::INFINITY), "Infinity%");
        assert_eq!(format_percentage(f64::NAN), "NaN%");
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(0.25, 1), "0.3");
    }

    #[test]
    fn inexact_halves_follow_the_stored_value() {
        // 1.005 and 1.45 are stored slightly below the midpoint.
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(1.45, 1), "1.4");
    }

    #[test]
    fn number_string_matches_javascript() {
        assert_eq!(js_number_string(50.0), "50");
        assert_eq!(js_number_string(33.5), "33.5");
        assert_eq!(js_number_string(-0.0), "0");
        assert_eq!(js_number_string(1e21), "1e+21");
        assert_eq!(js_number_string(1.5e-7), "1.5e-7");
        assert_eq!(js_number_string(f64::NAN), "NaN");
        assert_eq!(js_number_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn round_sends_halves_up() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(24.4), 24.0);
        assert_eq!(js_round(0.49999999999999994), 0.0);
        assert!(js_round(f64::NAN).is_nan());
    }
}
