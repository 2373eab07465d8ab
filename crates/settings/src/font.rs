//! 字型大小的範圍與解析規則。 / Font-size bounds and parsing rules.

pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 24;
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// 將要求的字型大小限制在 [12, 24]。 / Clamps a requested font size into [12, 24].
pub fn clamp_font_size(requested: i64) -> u32 {
    requested.clamp(i64::from(MIN_FONT_SIZE), i64::from(MAX_FONT_SIZE)) as u32
}

/// 解析字串開頭的整數（允許前置空白與正負號，忽略其後內容）。 /
/// Parses the leading integer of a persisted value, allowing leading whitespace and a sign
/// and ignoring any trailing text. Returns `None` when no digits lead the string.
pub fn parse_font_size(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}
