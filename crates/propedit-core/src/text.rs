//! Lenient number parsing and formatting for editable text fields.

/// Parse the leading number of a field, ignoring trailing units or junk
/// (`"3.5um"` parses as `3.5`). Returns `None` when no number is present.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    while end < bytes.len() {
        let c = bytes[end];
        match c {
            b'0'..=b'9' => seen_digit = true,
            b'+' | b'-' => {
                let at_start = end == 0;
                let after_exp = end > 0 && matches!(bytes[end - 1], b'e' | b'E');
                if !at_start && !after_exp {
                    break;
                }
            }
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                // only an exponent if a digit follows
                let rest = &bytes[end + 1..];
                let digit_follows = match rest {
                    [b'+' | b'-', d, ..] => d.is_ascii_digit(),
                    [d, ..] => d.is_ascii_digit(),
                    [] => false,
                };
                if !digit_follows {
                    break;
                }
                seen_exp = true;
            }
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }
    text[..end].parse().ok()
}

/// Parse a field, falling back to `previous` when the text holds no number.
pub fn parse_or(text: &str, previous: f64) -> f64 {
    match parse_number(text) {
        Some(v) => v,
        None => {
            log::debug!("unparsable number {text:?}, keeping {previous}");
            previous
        }
    }
}

/// Format a value the way the editor displays it: at most four decimals,
/// trailing zeros removed.
pub fn format_number(value: f64) -> String {
    let mut s = format!("{value:.4}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
