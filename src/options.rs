//! Per-call report configuration: output toggles, axis bounds and styling overrides

use crate::error::{ReportError, ReportResult};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Output switches shared by every report call.
///
/// `Default` yields both text and graph output with no bounds and an empty,
/// freshly allocated set of plot options.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Render a chart through the context's renderer
    pub graph: bool,
    /// Write a human-readable summary to the context's writer
    pub text: bool,
    /// X-axis limits, applied to histogram charts only
    pub bounds: Option<Bounds>,
    /// Styling overrides forwarded to the renderer untouched
    pub plot_options: PlotOptions,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            graph: true,
            text: true,
            bounds: None,
            plot_options: PlotOptions::new(),
        }
    }
}

impl ReportOptions {
    pub fn text_only() -> Self {
        Self {
            graph: false,
            ..Self::default()
        }
    }

    pub fn graph_only() -> Self {
        Self {
            text: false,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_plot_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.plot_options.insert(key, value);
        self
    }
}

/// Validated x-axis limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> ReportResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ReportError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Ordered map of chart styling overrides (`color`, `bins`, `alpha`, ...).
///
/// Reports never interpret these; the renderer decides what each key means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotOptions(BTreeMap<String, String>);

impl PlotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parse the value stored under `key`, if any.
    pub fn parse<T>(&self, key: &str) -> ReportResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|err| ReportError::InvalidPlotOption {
                    key: key.to_string(),
                    value: raw.to_string(),
                    reason: err.to_string(),
                }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn extend(&mut self, other: PlotOptions) {
        self.0.extend(other.0);
    }

    /// Build options from a JSON object. Scalar values are kept as their
    /// textual form, so `{"bins": 20}` and `{"bins": "20"}` are equivalent.
    pub fn from_json_str(json: &str) -> ReportResult<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut options = Self::new();
        for (key, value) in raw {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ReportError::InvalidPlotOption {
                        key,
                        value: other.to_string(),
                        reason: "expected a string, number or boolean".to_string(),
                    })
                }
            };
            options.insert(key, text);
        }
        Ok(options)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ReportResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl<K, V> FromIterator<(K, V)> for PlotOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ReportOptions::default();
        assert!(options.graph);
        assert!(options.text);
        assert!(options.bounds.is_none());
        assert!(options.plot_options.is_empty());
    }

    #[test]
    fn test_defaults_do_not_share_plot_options() {
        let first = ReportOptions::default().with_plot_option("color", "blue");
        let second = ReportOptions::default();
        assert_eq!(first.plot_options.get("color"), Some("blue"));
        assert!(second.plot_options.is_empty());
    }

    #[test]
    fn test_bounds_validation() {
        let bounds = Bounds::new(0.0, 50.0).unwrap();
        assert_eq!(bounds.min(), 0.0);
        assert_eq!(bounds.max(), 50.0);

        assert!(matches!(
            Bounds::new(5.0, 5.0),
            Err(ReportError::InvalidBounds { .. })
        ));
        assert!(Bounds::new(10.0, 1.0).is_err());
        assert!(Bounds::new(f64::NAN, 1.0).is_err());
        assert!(Bounds::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_plot_option() {
        let options: PlotOptions = [("bins", "20"), ("alpha", "oops")].into_iter().collect();
        assert_eq!(options.parse::<usize>("bins").unwrap(), Some(20));
        assert_eq!(options.parse::<usize>("width").unwrap(), None);

        let err = options.parse::<f64>("alpha").unwrap_err();
        assert!(matches!(err, ReportError::InvalidPlotOption { ref key, .. } if key == "alpha"));
    }

    #[test]
    fn test_plot_options_from_json() {
        let options =
            PlotOptions::from_json_str(r##"{"bins": 20, "color": "#336699", "grid": true}"##)
                .unwrap();
        assert_eq!(options.get("bins"), Some("20"));
        assert_eq!(options.get("color"), Some("#336699"));
        assert_eq!(options.get("grid"), Some("true"));

        assert!(PlotOptions::from_json_str(r#"{"bins": [1, 2]}"#).is_err());
        assert!(PlotOptions::from_json_str("not json").is_err());
    }

    #[test]
    fn test_extend_overrides() {
        let mut base: PlotOptions = [("color", "red"), ("bins", "5")].into_iter().collect();
        base.extend([("color", "blue")].into_iter().collect());
        assert_eq!(base.get("color"), Some("blue"));
        assert_eq!(base.get("bins"), Some("5"));
        assert_eq!(base.len(), 2);
    }
}
