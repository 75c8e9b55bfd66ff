//! Purchase frequency and transaction amount reports

use crate::error::{ReportError, ReportResult};
use crate::options::ReportOptions;
use crate::report::{percentage, Report, ReportContext};
use crate::stats::{describe, group_totals, Bins, Describe};
use crate::viz::{ChartRenderer, PlotSpec};
use std::collections::BTreeMap;
use std::hash::Hash;
use std::io::{self, Write};

/// Upper edge of the visit-count histogram
const MAX_VISIT_BUCKET: u32 = 10;

/// How often each customer came back.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseFrequency {
    /// Transactions per customer, in first-seen order
    visits: Vec<usize>,
    /// Number of customers per visit count
    distribution: BTreeMap<usize, usize>,
    repeat_rate: f64,
}

impl PurchaseFrequency {
    /// Count transactions per customer from one id per transaction.
    pub fn from_customers<K: Eq + Hash>(customer_ids: &[K]) -> ReportResult<Self> {
        if customer_ids.is_empty() {
            return Err(ReportError::InsufficientData {
                report: "purchase frequency",
            });
        }

        let visits: Vec<usize> = group_totals(customer_ids.iter().map(|id| (id, 1usize)))
            .into_iter()
            .map(|(_, count)| count)
            .collect();

        let mut distribution = BTreeMap::new();
        for &count in &visits {
            *distribution.entry(count).or_insert(0usize) += 1;
        }

        let one_time = distribution.get(&1).copied().unwrap_or(0);
        let repeat_rate = 1.0 - one_time as f64 / visits.len() as f64;

        Ok(Self {
            visits,
            distribution,
            repeat_rate,
        })
    }

    /// Share of customers with more than one transaction, in `[0, 1]`.
    pub fn repeat_rate(&self) -> f64 {
        self.repeat_rate
    }

    pub fn distinct_customers(&self) -> usize {
        self.visits.len()
    }

    pub fn repeat_customers(&self) -> usize {
        self.distinct_customers() - self.customers_with_visits(1)
    }

    pub fn customers_with_visits(&self, visits: usize) -> usize {
        self.distribution.get(&visits).copied().unwrap_or(0)
    }

    pub fn visits_per_customer(&self) -> &[usize] {
        &self.visits
    }

    /// Visit count → number of customers with exactly that many visits
    pub fn distribution(&self) -> &BTreeMap<usize, usize> {
        &self.distribution
    }
}

impl Report for PurchaseFrequency {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{:.2}% of customers are repeat customers ({} of {})",
            percentage(self.repeat_customers(), self.distinct_customers()),
            self.repeat_customers(),
            self.distinct_customers()
        )
    }

    fn plot_spec(&self) -> PlotSpec {
        let edges = (1..=MAX_VISIT_BUCKET).map(f64::from).collect();
        PlotSpec::histogram(
            "Number of Orders per Customer",
            "Number of Orders",
            self.visits.iter().map(|&v| v as f64).collect(),
            Bins::Edges(edges),
        )
    }
}

/// Report the repeat-customer rate for one customer id per transaction.
pub fn purchase_frequency<K, W, R>(
    customer_ids: &[K],
    options: &ReportOptions,
    ctx: &mut ReportContext<W, R>,
) -> ReportResult<f64>
where
    K: Eq + Hash,
    W: Write,
    R: ChartRenderer,
{
    let report = PurchaseFrequency::from_customers(customer_ids)?;
    log::debug!(
        "purchase frequency: {} transactions across {} customers",
        customer_ids.len(),
        report.distinct_customers()
    );

    ctx.publish(&report, options)?;
    Ok(report.repeat_rate())
}

/// Distribution of individual transaction amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragePurchase {
    amounts: Vec<f64>,
    summary: Describe,
}

impl AveragePurchase {
    pub fn from_amounts(amounts: &[f64]) -> ReportResult<Self> {
        if amounts.is_empty() {
            return Err(ReportError::InsufficientData {
                report: "average purchase",
            });
        }
        check_amounts(amounts)?;

        Ok(Self {
            amounts: amounts.to_vec(),
            summary: describe(amounts)?,
        })
    }

    pub fn summary(&self) -> &Describe {
        &self.summary
    }
}

impl Report for AveragePurchase {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Transaction amounts: {}", self.summary)
    }

    fn plot_spec(&self) -> PlotSpec {
        PlotSpec::histogram(
            "Individual Transaction Amounts",
            "Transaction Amount",
            self.amounts.clone(),
            Bins::default(),
        )
    }
}

/// Summarise a flat sequence of transaction amounts.
pub fn average_purchase<W, R>(
    amounts: &[f64],
    options: &ReportOptions,
    ctx: &mut ReportContext<W, R>,
) -> ReportResult<Describe>
where
    W: Write,
    R: ChartRenderer,
{
    let report = AveragePurchase::from_amounts(amounts)?;
    log::debug!("average purchase: {} transactions", amounts.len());

    ctx.publish(&report, options)?;
    Ok(report.summary)
}

/// Reject NaN and infinite amounts.
pub(crate) fn check_amounts(amounts: &[f64]) -> ReportResult<()> {
    match amounts.iter().position(|a| !a.is_finite()) {
        Some(index) => Err(ReportError::InvalidAmount {
            index,
            value: amounts[index],
        }),
        None => Ok(()),
    }
}
