//! Roast log ingestion.
//!
//! Device exports carry a free-form preamble (with optional `Yellowing` and
//! `1st Crack` blocks) followed by a `Timeline` marker and a delimited table.
//! Column names drift between firmware versions, so the table header is
//! matched fuzzily against an ordered canonical list.

use std::io::Read;
use std::path::Path;

use crate::error::ParseError;
use crate::milestones::Milestones;
use crate::series::Series;
use crate::time::{parse_number, parse_time};

/// Canonical table columns, in matching priority order.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "Time",
    "IBTS Temp",
    "IBTS ROR",
    "Bean Probe Temp",
    "Bean Probe ROR",
    "Fan",
    "Power",
];

/// Keywords that identify the real table header after the marker line.
const HEADER_KEYWORDS: [&str; 6] = ["temp", "time", "czas", "ibts", "probe", "ror"];

/// How many lines after the `Timeline` marker the header may appear.
const HEADER_SEARCH_LINES: usize = 4;

/// Fallback column of a milestone's start time in the preamble.
const MILESTONE_VALUE_INDEX: usize = 2;

pub fn parse_log_path(path: &Path) -> Result<(Series, Milestones), ParseError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ParseError::Unreadable(format!("{}: {e}", path.display())))?;
    parse_log_bytes(&bytes)
}

pub fn parse_log_reader<R: Read>(mut reader: R) -> Result<(Series, Milestones), ParseError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_log_bytes(&bytes)
}

pub fn parse_log_bytes(bytes: &[u8]) -> Result<(Series, Milestones), ParseError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::Unreadable(format!("invalid UTF-8: {e}")))?;
    parse_log(text)
}

/// Parse the full text of a roast log into its time series and milestones.
pub fn parse_log(text: &str) -> Result<(Series, Milestones), ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();

    let timeline = lines
        .iter()
        .position(|l| l.starts_with("Timeline"))
        .ok_or(ParseError::MissingTimeline)?;

    let mut milestones = scan_preamble(&lines[..timeline], &lines[timeline..]);

    let header = (timeline..lines.len().min(timeline + HEADER_SEARCH_LINES + 1))
        .find(|&i| {
            // The marker token itself would satisfy the "time" keyword.
            let line = if i == timeline {
                &lines[i]["Timeline".len()..]
            } else {
                lines[i]
            };
            looks_like_header(line)
        })
        .ok_or(ParseError::MissingHeader)?;
    tracing::debug!(timeline, header, "located timeline table");

    let table = lines[header..].join("\n");
    let series = parse_table(&table, detect_delimiter(lines[header]))?;

    if let Some(&last) = series.time().last()
        && last.is_finite()
        && milestones.get("Drop").is_none_or(|t| !t.is_finite())
    {
        milestones.insert("Drop", last);
    }
    Ok((series, milestones))
}

/// Extract best-effort milestone annotations from the lines before `Timeline`.
///
/// `after` holds the marker and following lines; a `1st Crack` block right
/// before the marker may reach into them.
fn scan_preamble(preamble: &[&str], after: &[&str]) -> Milestones {
    let mut out = Milestones::default();
    for (i, line) in preamble.iter().enumerate() {
        if line.contains("Yellowing")
            && let Some(values) = line_at(preamble, after, i + 1)
        {
            let headers = split_cells(line);
            let idx = headers
                .iter()
                .position(|h| *h == "Start time")
                .unwrap_or(MILESTONE_VALUE_INDEX);
            if let Some(t) = split_cells(values).get(idx).and_then(|v| parse_time(v)) {
                out.insert("Yellowing", t);
            }
        }
        if line.contains("1st Crack")
            && let Some(values) = line_at(preamble, after, i + 2)
            && let Some(t) = split_cells(values)
                .get(MILESTONE_VALUE_INDEX)
                .and_then(|v| parse_time(v))
        {
            out.insert("1st Crack", t);
        }
    }
    out
}

fn line_at<'a>(preamble: &[&'a str], after: &[&'a str], i: usize) -> Option<&'a str> {
    if i < preamble.len() {
        Some(preamble[i])
    } else {
        after.get(i - preamble.len()).copied()
    }
}

fn split_cells(line: &str) -> Vec<&str> {
    line.split(detect_delimiter(line) as char)
        .map(str::trim)
        .collect()
}

fn looks_like_header(line: &str) -> bool {
    if !(line.contains(',') || line.contains(';')) {
        return false;
    }
    let lower = line.to_lowercase();
    HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Pick `;` when it outnumbers `,` on the header line.
pub fn detect_delimiter(line: &str) -> u8 {
    let commas = line.matches(',').count();
    let semis = line.matches(';').count();
    if semis > commas { b';' } else { b',' }
}

/// Map each canonical name to the header index that carries it.
///
/// Exact matches are claimed first; remaining canonical names take the first
/// unclaimed header containing them (case-insensitive).
pub fn resolve_columns(headers: &[String]) -> Vec<(&'static str, usize)> {
    let mut claimed = vec![false; headers.len()];
    let mut resolved: Vec<(&'static str, Option<usize>)> = CANONICAL_COLUMNS
        .iter()
        .map(|&c| {
            let hit = headers.iter().position(|h| h == c);
            if let Some(i) = hit {
                claimed[i] = true;
            }
            (c, hit)
        })
        .collect();
    for (canon, slot) in &mut resolved {
        if slot.is_some() {
            continue;
        }
        let needle = canon.to_lowercase();
        if let Some(i) =
            (0..headers.len()).find(|&i| !claimed[i] && headers[i].to_lowercase().contains(&needle))
        {
            tracing::debug!(canonical = *canon, actual = %headers[i], "fuzzy column match");
            claimed[i] = true;
            *slot = Some(i);
        }
    }
    resolved
        .into_iter()
        .filter_map(|(c, i)| i.map(|i| (c, i)))
        .collect()
}

fn parse_table(table: &str, delimiter: u8) -> Result<Series, ParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(table.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let resolved = resolve_columns(&headers);
    let Some(&(_, time_idx)) = resolved.iter().find(|(c, _)| *c == "Time") else {
        return Err(ParseError::MissingTimeColumn { available: headers });
    };
    let channels: Vec<(&'static str, usize)> = resolved
        .iter()
        .copied()
        .filter(|(c, _)| *c != "Time")
        .collect();

    let mut time = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); channels.len()];
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        time.push(record.get(time_idx).and_then(parse_time).unwrap_or(f64::NAN));
        for (slot, (_, idx)) in values.iter_mut().zip(&channels) {
            slot.push(record.get(*idx).and_then(parse_number).unwrap_or(f64::NAN));
        }
    }

    let mut series = Series::new(time);
    for ((name, _), col) in channels.into_iter().zip(values) {
        series.set_column(name, col);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(v: &[&str]) -> Vec<String> {
        v.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn exact_names_win_over_substrings() {
        let h = headers(&["Time", "IBTS Temp", "IBTS Temp (raw)"]);
        let r = resolve_columns(&h);
        assert!(r.contains(&("Time", 0)));
        assert!(r.contains(&("IBTS Temp", 1)));
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let h = headers(&["Elapsed time", "ibts temp (C)", "Fan speed"]);
        let r = resolve_columns(&h);
        assert!(r.contains(&("Time", 0)));
        assert!(r.contains(&("IBTS Temp", 1)));
        assert!(r.contains(&("Fan", 2)));
    }

    #[test]
    fn delimiter_detection() {
        assert_eq!(detect_delimiter("Time;IBTS Temp;Fan"), b';');
        assert_eq!(detect_delimiter("Time,IBTS Temp"), b',');
    }
}
