//! Conversion of abbreviated display counts (`"12.3K"`, `"4M"`, `"1,234"`)
//! into integers.
//!
//! Profile pages render counts for humans, so the same value can show up as
//! `"1,204"`, `"1.2K"` or `"1.2k"` depending on locale and magnitude.

/// Parses a display count, mapping anything unparsable to `0`.
///
/// Total over all inputs: empty strings, `"N/A"` and garbage all yield `0`.
/// Use [`try_parse_count`] when an absent value must be told apart from a
/// genuine zero.
#[must_use]
pub fn parse_count(display: &str) -> u64 {
    try_parse_count(display).unwrap_or(0)
}

/// Parses a display count, returning `None` when no number can be read.
///
/// Thousands separators are removed first. A trailing `K`, `M` or `B`
/// (either case) scales the numeric prefix, which may be fractional; the
/// scaled value is rounded to the nearest integer. Without a suffix only the
/// leading run of digits is read, so `"1.9"` reads as `1`.
#[must_use]
pub fn try_parse_count(display: &str) -> Option<u64> {
    let cleaned: String = display.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("n/a") {
        return None;
    }

    match split_suffix(&cleaned) {
        (number, Some(multiplier)) => scale(leading_float(number.trim_end())?, multiplier),
        (number, None) => leading_integer(number),
    }
}

fn split_suffix(s: &str) -> (&str, Option<u64>) {
    let multiplier = match s.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('K') => 1_000,
        Some('M') => 1_000_000,
        Some('B') => 1_000_000_000,
        _ => return (s, None),
    };
    (&s[..s.len() - 1], Some(multiplier))
}

fn leading_integer(s: &str) -> Option<u64> {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    s[..end].parse().ok()
}

fn leading_float(s: &str) -> Option<f64> {
    let mut seen_dot = false;
    let end = s
        .bytes()
        .take_while(|b| match *b {
            b'0'..=b'9' => true,
            b'.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        })
        .count();
    s[..end].parse().ok()
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn scale(value: f64, multiplier: u64) -> Option<u64> {
    let scaled = (value * multiplier as f64).round();
    (scaled.is_finite() && scaled >= 0.0 && scaled < u64::MAX as f64).then_some(scaled as u64)
}
