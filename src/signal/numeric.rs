//! Numeric token grammar shared by every column of an export.
//!
//! Exports come from devices with different locales and unit conventions, so a cell is
//! considered numeric when it carries at least one digit. A decimal comma is normalised to
//! a period and the longest prefix of the form `-?digits[.digits]` is parsed, which keeps
//! unit-suffixed cells such as `56.4 kOhm` usable. Scientific notation is not part of the
//! grammar and reads as missing.

/// Parse a single CSV cell. Returns `None` for anything that is not a finite number.
pub fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if !token.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let normalized = token.replace(',', ".");
    let prefix = numeric_prefix(&normalized)?;
    if has_exponent(&normalized[prefix.len()..]) {
        return None;
    }
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn numeric_prefix(token: &str) -> Option<&str> {
    let bytes = token.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;
    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut probe = end + 1;
        while probe < bytes.len() && bytes[probe].is_ascii_digit() {
            probe += 1;
        }
        frac_digits = probe - end - 1;
        if frac_digits > 0 {
            end = probe;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    Some(&token[..end])
}

/// `e`/`E`, optional sign, then a digit: scientific notation is outside the grammar.
fn has_exponent(rest: &str) -> bool {
    let mut bytes = rest.bytes();
    if !matches!(bytes.next(), Some(b'e' | b'E')) {
        return false;
    }
    match bytes.next() {
        Some(b'+' | b'-') => bytes.next().map_or(false, |b| b.is_ascii_digit()),
        Some(b) => b.is_ascii_digit(),
        None => false,
    }
}

/// Median of a slice; the input does not need to be sorted.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parses_plain_and_negative_numbers() {
        assert_eq!(parse_number("56.40"), Some(56.40));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("  12 "), Some(12.0));
    }
    #[test]
    fn decimal_comma_is_normalized() {
        assert_eq!(parse_number("4,95"), Some(4.95));
        assert_eq!(parse_number("-0,5"), Some(-0.5));
    }
    #[test]
    fn tokens_without_digits_are_missing() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("NaN"), None);
    }
    #[test]
    fn unit_suffix_is_ignored() {
        assert_eq!(parse_number("56.4 kOhm"), Some(56.4));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("7."), Some(7.0));
    }
    #[test]
    fn exponent_tokens_are_missing() {
        assert_eq!(parse_number("5.64E+01"), None);
        assert_eq!(parse_number("1e3"), None);
        assert_eq!(parse_number("-2,5e-2"), None);
        // a unit starting with "e" is still a suffix
        assert_eq!(parse_number("12 events"), Some(12.0));
        assert_eq!(parse_number("3eV"), Some(3.0));
    }
    #[test]
    fn leading_garbage_is_rejected() {
        assert_eq!(parse_number("kOhm 56"), None);
    }
    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
