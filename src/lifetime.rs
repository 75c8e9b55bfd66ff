//! Customer lifetime value report

use crate::error::{ReportError, ReportResult};
use crate::options::ReportOptions;
use crate::purchase::check_amounts;
use crate::report::{Report, ReportContext};
use crate::stats::{group_totals, mean, Bins};
use crate::viz::{ChartRenderer, PlotSpec};
use std::hash::Hash;
use std::io::{self, Write};

/// Total spend per customer.
#[derive(Debug, Clone, PartialEq)]
pub struct LifetimeValue<K> {
    /// `(customer, total)` in first-seen order
    totals: Vec<(K, f64)>,
    mean: f64,
}

impl<K: Eq + Hash + Clone> LifetimeValue<K> {
    /// Sum `amounts` per customer. Both slices describe the same
    /// transactions, so they must have the same length.
    pub fn from_transactions(customer_ids: &[K], amounts: &[f64]) -> ReportResult<Self> {
        if customer_ids.len() != amounts.len() {
            return Err(ReportError::LengthMismatch {
                customers: customer_ids.len(),
                amounts: amounts.len(),
            });
        }
        if customer_ids.is_empty() {
            return Err(ReportError::InsufficientData {
                report: "lifetime value",
            });
        }
        check_amounts(amounts)?;

        let totals: Vec<(K, f64)> = group_totals(customer_ids.iter().zip(amounts.iter().copied()))
            .into_iter()
            .map(|(id, total)| (id.clone(), total))
            .collect();

        let values: Vec<f64> = totals.iter().map(|(_, total)| *total).collect();
        let mean = mean(&values)?;

        Ok(Self { totals, mean })
    }
}

impl<K> LifetimeValue<K> {
    pub fn totals(&self) -> &[(K, f64)] {
        &self.totals
    }

    pub fn values(&self) -> Vec<f64> {
        self.totals.iter().map(|(_, total)| *total).collect()
    }

    /// Mean lifetime value across customers
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn customers(&self) -> usize {
        self.totals.len()
    }
}

impl<K: PartialEq> LifetimeValue<K> {
    pub fn total_for(&self, customer: &K) -> Option<f64> {
        self.totals
            .iter()
            .find(|(id, _)| id == customer)
            .map(|(_, total)| *total)
    }
}

impl<K> Report for LifetimeValue<K> {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "Your average customer is worth ${:.2} over their lifetime.",
            self.mean
        )
    }

    fn plot_spec(&self) -> PlotSpec {
        PlotSpec::histogram(
            "Lifetime Value of Customers (to date)",
            "Lifetime Value",
            self.values(),
            Bins::default(),
        )
    }
}

/// Report per-customer lifetime value from index-aligned ids and amounts.
pub fn lifetime_value<K, W, R>(
    customer_ids: &[K],
    amounts: &[f64],
    options: &ReportOptions,
    ctx: &mut ReportContext<W, R>,
) -> ReportResult<LifetimeValue<K>>
where
    K: Eq + Hash + Clone,
    W: Write,
    R: ChartRenderer,
{
    let report = LifetimeValue::from_transactions(customer_ids, amounts)?;
    log::debug!(
        "lifetime value: {} transactions across {} customers",
        amounts.len(),
        report.customers()
    );

    ctx.publish(&report, options)?;
    Ok(report)
}
