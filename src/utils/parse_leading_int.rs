/// Scans a leading decimal integer the way C's `%d` conversion does.
///
/// Leading ASCII whitespace is skipped, an optional `+`/`-` sign is accepted,
/// and digits are consumed until the first non-digit. Values that do not fit
/// in an `i64` saturate.
///
/// # Returns:
/// - `Some((value, consumed))` where `consumed` counts every byte read,
///   whitespace and sign included.
/// - `None` if no digit follows the optional whitespace and sign.
pub fn scan_leading_int(bytes: &[u8]) -> Option<(i64, usize)> {
    let mut pos = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());

    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits_start = pos;
    let mut value: i64 = 0;
    while let Some(&b) = bytes.get(pos) {
        if !b.is_ascii_digit() {
            break;
        }
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
        pos += 1;
    }

    (pos > digits_start).then_some((value, pos))
}

/// Best-effort integer parsing with `atoi` semantics: anything that does not
/// start with a number yields `0`.
pub fn parse_int_lenient(text: &str) -> i64 {
    scan_leading_int(text.as_bytes()).map_or(0, |(value, _)| value)
}
