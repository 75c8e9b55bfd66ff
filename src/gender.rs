//! Gender inference from first names and the gender breakdown report

use crate::error::{ReportError, ReportResult};
use crate::options::ReportOptions;
use crate::report::{percentage, Report, ReportContext};
use crate::viz::{ChartRenderer, PlotSpec};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

/// First name used when a full name cannot be split.
pub const UNKNOWN_NAME: &str = "unknown";

/// Fine-grained answer of a name→gender oracle.
///
/// Deserializes from any oracle token, with the same leniency as
/// [`OracleGender::from_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum OracleGender {
    Female,
    MostlyFemale,
    Male,
    MostlyMale,
    Andy,
    Unknown,
}

impl From<String> for OracleGender {
    fn from(token: String) -> Self {
        Self::from_token(&token)
    }
}

impl OracleGender {
    /// Map an oracle token to its variant; unrecognised tokens are `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "female" => OracleGender::Female,
            "mostly_female" => OracleGender::MostlyFemale,
            "male" => OracleGender::Male,
            "mostly_male" => OracleGender::MostlyMale,
            "andy" | "androgynous" => OracleGender::Andy,
            _ => OracleGender::Unknown,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            OracleGender::Female => "female",
            OracleGender::MostlyFemale => "mostly_female",
            OracleGender::Male => "male",
            OracleGender::MostlyMale => "mostly_male",
            OracleGender::Andy => "andy",
            OracleGender::Unknown => "unknown",
        }
    }
}

/// Three-way category reported to users. Confidence levels are folded in:
/// `mostly_female` counts as `Female`, `mostly_male` as `Male`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenderCategory {
    Female,
    Male,
    AndroUnknown,
}

impl GenderCategory {
    /// Reporting order
    pub const ALL: [GenderCategory; 3] = [
        GenderCategory::Female,
        GenderCategory::Male,
        GenderCategory::AndroUnknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GenderCategory::Female => "Female",
            GenderCategory::Male => "Male",
            GenderCategory::AndroUnknown => "Andro/Unknown",
        }
    }

    fn index(&self) -> usize {
        match self {
            GenderCategory::Female => 0,
            GenderCategory::Male => 1,
            GenderCategory::AndroUnknown => 2,
        }
    }
}

impl fmt::Display for GenderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<OracleGender> for GenderCategory {
    fn from(gender: OracleGender) -> Self {
        match gender {
            OracleGender::Female | OracleGender::MostlyFemale => GenderCategory::Female,
            OracleGender::Male | OracleGender::MostlyMale => GenderCategory::Male,
            OracleGender::Andy | OracleGender::Unknown => GenderCategory::AndroUnknown,
        }
    }
}

/// External name→gender classifier.
pub trait GenderOracle {
    /// Classify a single first name. Must accept [`UNKNOWN_NAME`].
    fn get_gender(&self, first_name: &str) -> ReportResult<OracleGender>;
}

/// Oracle backed by an in-memory name table. Names missing from the table
/// are `Unknown`.
#[derive(Debug, Clone)]
pub struct NameTableOracle {
    names: HashMap<String, OracleGender>,
    case_sensitive: bool,
}

impl Default for NameTableOracle {
    fn default() -> Self {
        Self {
            names: HashMap::new(),
            case_sensitive: false,
        }
    }
}

impl NameTableOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_name(mut self, name: &str, gender: OracleGender) -> Self {
        self.insert(name, gender);
        self
    }

    pub fn insert(&mut self, name: &str, gender: OracleGender) {
        let key = self.key(name);
        self.names.insert(key, gender);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Load a table from a JSON object mapping names to oracle tokens,
    /// e.g. `{"alice": "female", "sam": "andy"}`.
    pub fn from_json_str(json: &str) -> ReportResult<Self> {
        let raw: HashMap<String, OracleGender> = serde_json::from_str(json)?;
        let mut oracle = Self::new();
        for (name, gender) in raw {
            oracle.insert(&name, gender);
        }
        Ok(oracle)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ReportResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn key(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }
}

impl GenderOracle for NameTableOracle {
    fn get_gender(&self, first_name: &str) -> ReportResult<OracleGender> {
        let key = if self.case_sensitive {
            self.names.get(first_name)
        } else {
            self.names.get(&first_name.to_lowercase())
        };
        Ok(key.copied().unwrap_or(OracleGender::Unknown))
    }
}

/// A name column entry that may be absent.
pub trait NameField {
    fn as_name(&self) -> Option<&str>;
}

impl NameField for str {
    fn as_name(&self) -> Option<&str> {
        Some(self)
    }
}

impl NameField for String {
    fn as_name(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: NameField + ?Sized> NameField for &T {
    fn as_name(&self) -> Option<&str> {
        (**self).as_name()
    }
}

impl<T: NameField> NameField for Option<T> {
    fn as_name(&self) -> Option<&str> {
        self.as_ref().and_then(|name| name.as_name())
    }
}

/// First whitespace-delimited token of `full_name`, or [`UNKNOWN_NAME`] when
/// there is none.
pub fn first_name(full_name: Option<&str>) -> &str {
    full_name
        .and_then(|name| name.split_whitespace().next())
        .unwrap_or(UNKNOWN_NAME)
}

/// Classifies full names into a [`GenderCategory`] through an oracle.
pub struct GenderClassifier<'a> {
    oracle: &'a dyn GenderOracle,
}

impl<'a> GenderClassifier<'a> {
    pub fn new(oracle: &'a dyn GenderOracle) -> Self {
        Self { oracle }
    }

    /// Classify one name. Malformed or missing names land in
    /// `AndroUnknown`; only an oracle failure is an error.
    pub fn classify(&self, full_name: Option<&str>) -> ReportResult<GenderCategory> {
        let name = first_name(full_name);
        let gender = self.oracle.get_gender(name)?;
        Ok(gender.into())
    }
}

/// Customer counts per gender category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenderBreakdown {
    counts: [usize; 3],
}

impl GenderBreakdown {
    pub fn from_names<N: NameField>(
        classifier: &GenderClassifier<'_>,
        names: &[N],
    ) -> ReportResult<Self> {
        if names.is_empty() {
            return Err(ReportError::InsufficientData {
                report: "gender breakdown",
            });
        }

        let mut breakdown = Self::default();
        for name in names {
            let category = classifier.classify(name.as_name())?;
            breakdown.counts[category.index()] += 1;
        }
        Ok(breakdown)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn count(&self, category: GenderCategory) -> usize {
        self.counts[category.index()]
    }

    pub fn percentage(&self, category: GenderCategory) -> f64 {
        percentage(self.count(category), self.total())
    }

    /// `(category, count)` pairs in reporting order, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (GenderCategory, usize)> + '_ {
        GenderCategory::ALL
            .into_iter()
            .map(move |category| (category, self.count(category)))
    }
}

impl Report for GenderBreakdown {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Out of {} total customers:", self.total())?;
        for (category, count) in self.iter() {
            writeln!(
                out,
                "\t{} ({:.2}%) customers were {}",
                count,
                self.percentage(category),
                category
            )?;
        }
        Ok(())
    }

    fn plot_spec(&self) -> PlotSpec {
        let (labels, heights) = self
            .iter()
            .map(|(category, count)| (category.label().to_string(), count as f64))
            .unzip();
        PlotSpec::bar("Gender Breakdown of Customers", "Customers", labels, heights)
    }
}

/// Classify every name and publish the category tallies.
pub fn gender_breakdown<N, W, R>(
    names: &[N],
    oracle: &dyn GenderOracle,
    options: &ReportOptions,
    ctx: &mut ReportContext<W, R>,
) -> ReportResult<GenderBreakdown>
where
    N: NameField,
    W: Write,
    R: ChartRenderer,
{
    let classifier = GenderClassifier::new(oracle);
    let breakdown = GenderBreakdown::from_names(&classifier, names)?;
    log::debug!(
        "gender breakdown: {} names, {} female, {} male, {} andro/unknown",
        breakdown.total(),
        breakdown.count(GenderCategory::Female),
        breakdown.count(GenderCategory::Male),
        breakdown.count(GenderCategory::AndroUnknown)
    );

    ctx.publish(&breakdown, options)?;
    Ok(breakdown)
}
