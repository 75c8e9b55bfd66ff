//! custlens: descriptive statistics over customer transaction records
//!
//! Four independent reports (purchase frequency, gender breakdown, average
//! purchase and lifetime value) operate on in-memory sequences and emit a text
//! summary and/or a chart through a [`ReportContext`].

pub mod cli;
pub mod error;
pub mod gender;
pub mod lifetime;
pub mod options;
pub mod purchase;
pub mod report;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use error::{ReportError, ReportResult};
pub use gender::{
    gender_breakdown, GenderBreakdown, GenderCategory, GenderClassifier, GenderOracle,
    NameTableOracle, OracleGender,
};
pub use lifetime::{lifetime_value, LifetimeValue};
pub use options::{Bounds, PlotOptions, ReportOptions};
pub use purchase::{average_purchase, purchase_frequency, AveragePurchase, PurchaseFrequency};
pub use report::{Report, ReportContext};
pub use stats::Describe;
pub use viz::{ChartFormat, ChartRenderer, CollectingRenderer, PlotSpec, PlottersRenderer};

/// Common result type used by the command-line front end
pub type Result<T> = anyhow::Result<T>;
