use thiserror::Error;

/// Structural failures while ingesting a log or plan file.
///
/// Anything recoverable (a bad cell, a malformed milestone) never surfaces here;
/// those degrade to `NaN` / absent values instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to read file: {0}")]
    Unreadable(String),
    #[error("missing timeline marker")]
    MissingTimeline,
    #[error("no tabular header found after the timeline marker")]
    MissingHeader,
    #[error("no 'Time' column found; available columns: {}", available.join(", "))]
    MissingTimeColumn { available: Vec<String> },
    #[error("plan file must contain a time column")]
    MissingPlanTimeColumn,
    #[error("malformed table: {0}")]
    Csv(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Unreadable(e.to_string())
    }
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

/// Numerical failures inside a filter; callers degrade these to neutral output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("polyorder {polyorder} must be less than window_length {window_length}")]
    PolyorderTooLarge {
        polyorder: usize,
        window_length: usize,
    },
    #[error("singular least-squares system")]
    Singular,
    #[error("not enough points: need {need}, got {got}")]
    NotEnoughPoints { need: usize, got: usize },
    #[error("evaluation grid of {0} points exceeds the limit")]
    GridTooLarge(usize),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
