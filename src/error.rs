//! Error types shared by every report

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("customer ids and amounts must be index-aligned: got {customers} ids and {amounts} amounts")]
    LengthMismatch { customers: usize, amounts: usize },

    #[error("insufficient data for {report}: no records supplied")]
    InsufficientData { report: &'static str },

    #[error("transaction amount at index {index} is not a finite number: {value}")]
    InvalidAmount { index: usize, value: f64 },

    #[error("invalid axis bounds ({min}, {max}): both must be finite and min below max")]
    InvalidBounds { min: f64, max: f64 },

    #[error("invalid plot option {key}={value}: {reason}")]
    InvalidPlotOption {
        key: String,
        value: String,
        reason: String,
    },

    #[error("gender oracle failed for '{name}': {source}")]
    Oracle {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for ReportError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ReportError::Render(err.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
