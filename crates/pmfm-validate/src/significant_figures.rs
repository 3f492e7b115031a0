//! Significant-figure counting on the textual form of a number.
//!
//! The counting rules are those enforced server-side, and one of them is
//! deliberately non-standard: trailing zeros of an integer part do not
//! count (`100` has 1 significant figure, not 3). Changing this would
//! reject data the server accepts, so keep the policy as is.

/// Count the significant figures of a numeric string.
///
/// Sign and surrounding whitespace are ignored, leading zeros never count.
/// With a decimal point and a zero integer part, leading zeros of the
/// fraction are skipped and trailing zeros dropped; with a non-zero
/// integer part every remaining digit counts. Without a decimal point,
/// trailing zeros are dropped.
pub fn count_significant_figures(input: &str) -> u32 {
    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

    let (integer_part, fraction_part) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    let integer_digits = integer_part.trim_start_matches('0');

    match fraction_part {
        Some(fraction) => {
            if integer_digits.is_empty() {
                digit_count(fraction.trim_start_matches('0').trim_end_matches('0'))
            } else {
                digit_count(integer_digits) + digit_count(fraction)
            }
        }
        None => digit_count(integer_digits.trim_end_matches('0')),
    }
}

fn digit_count(text: &str) -> u32 {
    text.chars().filter(|c| c.is_ascii_digit()).count() as u32
}
