use std::num::ParseIntError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Text is not of the form `YYYY-WW`.
    #[error("Invalid ISO week string: {0:?}")]
    IsoWeekString(String),

    /// Week component is not a week of the requested year.
    #[error("Invalid week number: {0}")]
    WeekNumber(u32),

    #[error("Invalid epoch timestamp: {0}")]
    Number(#[from] ParseIntError),

    #[error("Time does not match layout: {0}")]
    Layout(#[from] chrono::ParseError),

    #[error("Unsupported layout pattern: {0:?}")]
    InvalidLayout(String),

    #[error("Time out of range")]
    OutOfRange,
}

pub type Result<T> = std::result::Result<T, Error>;
