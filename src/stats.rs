//! Descriptive statistics, histogram binning and per-key accumulation

use crate::error::{ReportError, ReportResult};
use ndarray::ArrayView1;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::AddAssign;

/// Summary of a numeric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    /// Number of observations
    pub nobs: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample variance (ddof = 1); `None` for a single observation
    pub variance: Option<f64>,
    /// Biased skewness; `None` when every value is equal
    pub skewness: Option<f64>,
    /// Biased excess (Fisher) kurtosis; `None` when every value is equal
    pub kurtosis: Option<f64>,
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(value: Option<f64>) -> String {
            value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
        }

        write!(
            f,
            "nobs={}, min={:.2}, max={:.2}, mean={:.4}, variance={}, skewness={}, kurtosis={}",
            self.nobs,
            self.min,
            self.max,
            self.mean,
            opt(self.variance),
            opt(self.skewness),
            opt(self.kurtosis)
        )
    }
}

/// Compute the summary statistics of `values`.
pub fn describe(values: &[f64]) -> ReportResult<Describe> {
    let data = ArrayView1::from(values);
    let mean = data.mean().ok_or(ReportError::InsufficientData {
        report: "descriptive statistics",
    })?;

    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let variance = (data.len() > 1).then(|| data.var(1.0));

    // Central moments for the shape statistics
    let centered = &data - mean;
    let m2 = centered.mapv(|d| d.powi(2)).sum() / data.len() as f64;
    let m3 = centered.mapv(|d| d.powi(3)).sum() / data.len() as f64;
    let m4 = centered.mapv(|d| d.powi(4)).sum() / data.len() as f64;

    let (skewness, kurtosis) = if m2 > 0.0 {
        (Some(m3 / m2.powf(1.5)), Some(m4 / m2.powi(2) - 3.0))
    } else {
        (None, None)
    };

    Ok(Describe {
        nobs: data.len(),
        min,
        max,
        mean,
        variance,
        skewness,
        kurtosis,
    })
}

/// Arithmetic mean of `values`.
pub fn mean(values: &[f64]) -> ReportResult<f64> {
    ArrayView1::from(values)
        .mean()
        .ok_or(ReportError::InsufficientData { report: "mean" })
}

/// How a histogram splits its values into bins.
#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    /// Equal-width bins spanning the data
    Count(usize),
    /// Explicit, strictly increasing bin edges
    Edges(Vec<f64>),
}

/// Largest bin count a histogram accepts
pub const MAX_BINS: usize = 10_000;

impl Default for Bins {
    fn default() -> Self {
        Bins::Count(10)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bin `values`. Bins are half-open except the last, which includes its
/// upper edge; values outside the edges are not counted.
pub fn histogram(values: &[f64], bins: &Bins) -> ReportResult<Vec<HistogramBin>> {
    if values.is_empty() {
        return Err(ReportError::InsufficientData { report: "histogram" });
    }

    let edges = match bins {
        Bins::Count(0) => {
            return Err(ReportError::InvalidPlotOption {
                key: "bins".to_string(),
                value: "0".to_string(),
                reason: "at least one bin is required".to_string(),
            })
        }
        Bins::Count(n) if *n > MAX_BINS => {
            return Err(ReportError::InvalidPlotOption {
                key: "bins".to_string(),
                value: n.to_string(),
                reason: format!("at most {} bins are supported", MAX_BINS),
            })
        }
        Bins::Count(n) => equal_width_edges(values, *n)?,
        Bins::Edges(edges) => {
            if edges.len() < 2 || edges.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ReportError::InvalidPlotOption {
                    key: "bins".to_string(),
                    value: format!("{:?}", edges),
                    reason: "edges must be at least two strictly increasing values".to_string(),
                });
            }
            edges.clone()
        }
    };

    let last = edges.len() - 1;
    let mut counts = vec![0usize; last];
    for &value in values {
        let idx = edges.partition_point(|edge| *edge <= value);
        if idx == 0 {
            continue;
        }
        if idx > last {
            if value == edges[last] {
                counts[last - 1] += 1;
            }
            continue;
        }
        counts[idx - 1] += 1;
    }

    Ok(edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| HistogramBin {
            lower: w[0],
            upper: w[1],
            count,
        })
        .collect())
}

fn equal_width_edges(values: &[f64], n: usize) -> ReportResult<Vec<f64>> {
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    // Interpolate between the ends so ranges wider than f64::MAX stay finite
    let edges: Vec<f64> = (0..=n)
        .map(|i| {
            let t = i as f64 / n as f64;
            if i == n {
                hi
            } else {
                lo * (1.0 - t) + hi * t
            }
        })
        .collect();

    if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ReportError::InvalidPlotOption {
            key: "bins".to_string(),
            value: n.to_string(),
            reason: format!("cannot split the range [{}, {}] into {} bins", lo, hi, n),
        });
    }
    Ok(edges)
}

/// Accumulate a value per key, keeping keys in first-seen order.
pub fn group_totals<'a, K, T, I>(pairs: I) -> Vec<(&'a K, T)>
where
    K: Eq + Hash + 'a,
    T: Copy + Default + AddAssign,
    I: IntoIterator<Item = (&'a K, T)>,
{
    let mut index: HashMap<&'a K, usize> = HashMap::new();
    let mut totals: Vec<(&'a K, T)> = Vec::new();

    for (key, value) in pairs {
        let slot = *index.entry(key).or_insert_with(|| {
            totals.push((key, T::default()));
            totals.len() - 1
        });
        totals[slot].1 += value;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_describe_known_sample() {
        let summary = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(summary.nobs, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert!(approx(summary.mean, 3.0));
        assert!(approx(summary.variance.unwrap(), 2.5));
        assert!(approx(summary.skewness.unwrap(), 0.0));
        assert!(approx(summary.kurtosis.unwrap(), -1.3));
    }

    #[test]
    fn test_describe_degenerate_samples() {
        let single = describe(&[42.0]).unwrap();
        assert_eq!(single.nobs, 1);
        assert_eq!(single.variance, None);
        assert_eq!(single.skewness, None);

        let flat = describe(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(flat.variance, Some(0.0));
        assert_eq!(flat.kurtosis, None);

        assert!(matches!(
            describe(&[]),
            Err(ReportError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_describe_display() {
        let text = describe(&[2.0]).unwrap().to_string();
        assert!(text.starts_with("nobs=1, min=2.00, max=2.00"));
        assert!(text.contains("variance=n/a"));
    }

    #[test]
    fn test_mean() {
        assert!(approx(mean(&[30.0, 5.0, 3.0]).unwrap(), 38.0 / 3.0));
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn test_histogram_with_edges() {
        let edges: Vec<f64> = (1..=10).map(f64::from).collect();
        let values = [1.0, 1.0, 2.0, 3.0, 9.0, 10.0, 11.0, 0.5];
        let bins = histogram(&values, &Bins::Edges(edges)).unwrap();

        assert_eq!(bins.len(), 9);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[2].count, 1);
        // the last bin is closed on the right, 11.0 and 0.5 fall outside
        assert_eq!(bins[8].count, 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 6);
    }

    #[test]
    fn test_histogram_with_count() {
        let bins = histogram(&[0.0, 2.5, 5.0, 7.5, 10.0], &Bins::Count(4)).unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[3].upper, 10.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn test_histogram_equal_values() {
        let bins = histogram(&[4.0, 4.0], &Bins::Count(2)).unwrap();
        assert_eq!(bins[0].lower, 3.5);
        assert_eq!(bins[1].upper, 4.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_extreme_range() {
        let bins = histogram(&[-1e308, 0.0, 1e308], &Bins::Count(10)).unwrap();
        assert_eq!(bins.len(), 10);
        assert!(bins.iter().all(|b| b.lower.is_finite() && b.upper.is_finite()));
        assert_eq!(bins[0].lower, -1e308);
        assert_eq!(bins[9].upper, 1e308);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);

        let full = histogram(&[f64::MIN, f64::MAX], &Bins::Count(3)).unwrap();
        assert_eq!(full.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_rejects_unsplittable_range() {
        let tiny = [1.0, 1.0 + f64::EPSILON];
        assert!(matches!(
            histogram(&tiny, &Bins::Count(1000)),
            Err(ReportError::InvalidPlotOption { .. })
        ));
    }

    #[test]
    fn test_histogram_bin_limit() {
        assert!(histogram(&[1.0, 2.0], &Bins::Count(MAX_BINS)).is_ok());
        assert!(matches!(
            histogram(&[1.0, 2.0], &Bins::Count(usize::MAX)),
            Err(ReportError::InvalidPlotOption { .. })
        ));
    }

    #[test]
    fn test_histogram_invalid_input() {
        assert!(histogram(&[], &Bins::default()).is_err());
        assert!(histogram(&[1.0], &Bins::Count(0)).is_err());
        assert!(histogram(&[1.0], &Bins::Edges(vec![1.0])).is_err());
        assert!(histogram(&[1.0], &Bins::Edges(vec![2.0, 1.0])).is_err());
    }

    #[test]
    fn test_group_totals_first_seen_order() {
        let ids = ["b", "a", "b", "c", "a"];
        let totals = group_totals(ids.iter().zip([1, 2, 3, 4, 5]));
        assert_eq!(totals, vec![(&"b", 4), (&"a", 7), (&"c", 4)]);
    }
}
