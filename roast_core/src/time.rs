//! Textual time stamps to seconds.

/// Parse `ss`, `mm:ss` or `hh:mm:ss` into seconds.
///
/// Returns `None` for empty input, the `-` placeholder, `nan`, and anything that
/// fails numeric conversion. Negative components are passed through as parsed.
pub fn parse_time(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() || s == "-" || s.eq_ignore_ascii_case("nan") {
        return None;
    }
    let mut parts = [0.0f64; 3];
    let mut n = 0usize;
    for p in s.split(':') {
        if n == parts.len() {
            return None;
        }
        parts[n] = parse_number(p)?;
        n += 1;
    }
    let secs = match n {
        1 => parts[0],
        2 => parts[0] * 60.0 + parts[1],
        3 => parts[0] * 3600.0 + parts[1] * 60.0 + parts[2],
        _ => return None,
    };
    secs.is_finite().then_some(secs)
}

/// Like [`parse_time`] but for optional cells.
#[inline]
pub fn parse_time_opt(text: Option<&str>) -> Option<f64> {
    text.and_then(parse_time)
}

/// Lenient float parse used for table cells; rejects `NaN`/infinite spellings.
pub fn parse_number(text: &str) -> Option<f64> {
    let v: f64 = text.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

/// Render seconds as `m:ss` for report tables; `-` when unknown.
pub fn format_mmss(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "-".to_string();
    }
    let total = seconds.floor() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!("{sign}{}:{:02}", total / 60, total % 60)
}
