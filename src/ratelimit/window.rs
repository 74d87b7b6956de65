//! Window specification parsing.

use std::time::Duration;

/// Fallback window applied when a spec string cannot be parsed.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Parse a human window spec like `"10 m"` or `"500ms"` into a duration.
///
/// Accepts `<integer><unit>` with unit one of `ms`, `s`, `m`, `h`, `d`,
/// case-insensitive, with optional whitespace before the unit. Returns
/// [`DEFAULT_WINDOW`] on any malformed or non-positive input so that a bad
/// policy spec can never fail a caller's request.
pub fn parse_window(spec: &str) -> Duration {
    let trimmed = spec.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, rest) = trimmed.split_at(digits_end);

    let Ok(value) = digits.parse::<u64>() else {
        return DEFAULT_WINDOW;
    };
    if value == 0 {
        return DEFAULT_WINDOW;
    }

    let unit = rest.trim().to_ascii_lowercase();
    let millis = match unit.as_str() {
        "ms" => value,
        "s" => value.saturating_mul(1_000),
        "m" => value.saturating_mul(60_000),
        "h" => value.saturating_mul(3_600_000),
        "d" => value.saturating_mul(86_400_000),
        _ => return DEFAULT_WINDOW,
    };

    Duration::from_millis(millis)
}
