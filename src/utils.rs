//! Text helpers for control-point reads and writes.

/// Parse the leading unsigned decimal integer of `input`.
///
/// Mirrors `sscanf("%u")`: leading ASCII whitespace and one optional `+` are
/// skipped, at least one digit is required, and parsing stops at the first
/// non-digit, so `"1\n"`, `"+5"` and `"12abc"` yield 1, 5 and 12. A `-` sign
/// and values that overflow `u32` are rejected rather than wrapped.
#[must_use]
pub fn parse_unsigned(input: &str) -> Option<u32> {
    let trimmed = input.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Render a control-point value the way it is read back: decimal plus newline.
#[must_use]
pub fn format_value(value: u32) -> String {
    format!("{value}\n")
}
