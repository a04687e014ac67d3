//! Human-readable error descriptions and structured JSON error formatting.

use roast_core::ParseError;

/// Stable short name for a parse failure, used in JSON output.
pub fn parse_error_name(e: &ParseError) -> &'static str {
    match e {
        ParseError::Unreadable(_) => "Unreadable",
        ParseError::MissingTimeline => "MissingTimeline",
        ParseError::MissingHeader => "MissingHeader",
        ParseError::MissingTimeColumn { .. } => "MissingTimeColumn",
        ParseError::MissingPlanTimeColumn => "MissingPlanTimeColumn",
        ParseError::Csv(_) => "Csv",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(pe) = err.downcast_ref::<ParseError>() {
        return match pe {
            ParseError::Unreadable(msg) => format!(
                "What happened: The file could not be read ({msg}).\nLikely causes: Wrong path, missing permissions, or a file that is not UTF-8 text.\nHow to fix: Check the path and re-export the log from the roaster software as CSV."
            ),
            ParseError::MissingTimeline => {
                "What happened: The roast log has no 'Timeline' section.\nLikely causes: The file is not a roaster export, or it was edited and the marker line removed.\nHow to fix: Export the roast again; the sample table must follow a line starting with 'Timeline'.".to_string()
            }
            ParseError::MissingHeader => {
                "What happened: No column header was found right after the 'Timeline' marker.\nLikely causes: Extra lines between the marker and the table, or a delimiter other than ',' or ';'.\nHow to fix: Make sure the header row (Time, IBTS Temp, ...) sits within four lines of 'Timeline'.".to_string()
            }
            ParseError::MissingTimeColumn { available } => format!(
                "What happened: The sample table has no time column.\nLikely causes: The exporter renamed it; columns found: {}.\nHow to fix: Rename the elapsed-time column so its header contains 'Time'.",
                available.join(", ")
            ),
            ParseError::MissingPlanTimeColumn => {
                "What happened: The plan file has no time column.\nLikely causes: Header is not 'Czas' or 'Time', and the file does not have exactly three columns.\nHow to fix: Use headers like 'Faza,Czas,Temperatura' (or 'Phase,Time,Temp').".to_string()
            }
            ParseError::Csv(msg) => format!(
                "What happened: The table could not be parsed ({msg}).\nLikely causes: Unbalanced quotes or a truncated file.\nHow to fix: Open the file in a spreadsheet, fix the offending row and save it as CSV."
            ),
        };
    }

    // String-based heuristics for errors coming from config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("config") {
        let detail = err.root_cause().to_string();
        return format!(
            "What happened: Configuration is invalid ({detail}).\nLikely causes: A typo in a section name or an out-of-range value.\nHow to fix: Edit the TOML config and try again, or omit --config to use defaults."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Unreadable input exits with 3, malformed input with 4, anything else with 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<ParseError>() {
        Some(ParseError::Unreadable(_)) => 3,
        Some(_) => 4,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(pe) = err.downcast_ref::<ParseError>() {
        let mut obj = json!({ "reason": parse_error_name(pe), "message": humanize(err) });
        if let ParseError::MissingTimeColumn { available } = pe {
            obj["details"] = json!({ "available_columns": available });
        }
        return obj.to_string();
    }

    // Generic error JSON
    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}
