//! Shared plumbing that turns a computed report into text and charts

use crate::error::ReportResult;
use crate::options::ReportOptions;
use crate::viz::{ChartRenderer, PlotSpec};
use std::io::{self, Write};

/// A computed report that can describe itself as text and as a chart.
pub trait Report {
    /// Write the human-readable summary, one or more lines.
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Chart of the report before per-call bounds and styling are applied.
    fn plot_spec(&self) -> PlotSpec;
}

/// Where report text is written and charts are rendered.
///
/// Each report call borrows the context for its duration only.
pub struct ReportContext<W: Write, R: ChartRenderer> {
    out: W,
    renderer: R,
}

impl<R: ChartRenderer> ReportContext<io::Stdout, R> {
    pub fn stdout(renderer: R) -> Self {
        Self::new(io::stdout(), renderer)
    }
}

impl<W: Write, R: ChartRenderer> ReportContext<W, R> {
    pub fn new(out: W, renderer: R) -> Self {
        Self { out, renderer }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_parts(self) -> (W, R) {
        (self.out, self.renderer)
    }

    /// Emit `report` according to `options`. The renderer is not touched
    /// when graph output is off.
    pub fn publish(&mut self, report: &impl Report, options: &ReportOptions) -> ReportResult<()> {
        // A chart that cannot be drawn fails the call before any text goes out
        let spec = if options.graph {
            let spec = report
                .plot_spec()
                .with_bounds(options.bounds)
                .with_options(options.plot_options.clone());
            self.renderer.validate(&spec)?;
            Some(spec)
        } else {
            None
        };

        if options.text {
            report.write_summary(&mut self.out)?;
            self.out.flush()?;
        }

        if let Some(spec) = spec {
            self.renderer.render(&spec)?;
        }

        Ok(())
    }
}

/// Percentage of `part` in `total`, zero when there is nothing to divide by.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Bounds;
    use crate::stats::Bins;
    use crate::error::ReportError;
    use crate::viz::{ChartFormat, CollectingRenderer, PlottersRenderer};
    use tempfile::tempdir;

    struct Fixed;

    impl Report for Fixed {
        fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
            writeln!(out, "fixed summary")
        }

        fn plot_spec(&self) -> PlotSpec {
            PlotSpec::histogram("Fixed", "Value", vec![1.0, 2.0], Bins::default())
        }
    }

    fn context() -> ReportContext<Vec<u8>, CollectingRenderer> {
        ReportContext::new(Vec::new(), CollectingRenderer::new())
    }

    #[test]
    fn test_publish_text_and_graph() {
        let mut ctx = context();
        let options = ReportOptions::default()
            .with_bounds(Bounds::new(0.0, 3.0).unwrap())
            .with_plot_option("color", "blue");
        ctx.publish(&Fixed, &options).unwrap();

        let (out, renderer) = ctx.into_parts();
        assert_eq!(String::from_utf8(out).unwrap(), "fixed summary\n");
        assert_eq!(renderer.specs.len(), 1);
        assert_eq!(renderer.specs[0].bounds, Some(Bounds::new(0.0, 3.0).unwrap()));
        assert_eq!(renderer.specs[0].options.get("color"), Some("blue"));
    }

    #[test]
    fn test_publish_text_only_skips_renderer() {
        let mut ctx = context();
        ctx.publish(&Fixed, &ReportOptions::text_only()).unwrap();
        assert!(ctx.renderer().specs.is_empty());
        assert!(!ctx.writer().is_empty());
    }

    #[test]
    fn test_publish_graph_only_writes_nothing() {
        let mut ctx = context();
        ctx.publish(&Fixed, &ReportOptions::graph_only()).unwrap();
        assert!(ctx.writer().is_empty());
        assert_eq!(ctx.renderer().specs.len(), 1);
    }

    #[test]
    fn test_invalid_plot_option_suppresses_text() {
        let temp_dir = tempdir().unwrap();
        let renderer = PlottersRenderer::new(temp_dir.path(), ChartFormat::Png);
        let mut ctx = ReportContext::new(Vec::new(), renderer);

        let options = ReportOptions::default().with_plot_option("color", "nope");
        let result = ctx.publish(&Fixed, &options);
        assert!(matches!(result, Err(ReportError::InvalidPlotOption { .. })));

        let options = ReportOptions::default().with_plot_option("bins", usize::MAX.to_string());
        assert!(ctx.publish(&Fixed, &options).is_err());

        let (out, renderer) = ctx.into_parts();
        assert!(out.is_empty());
        assert!(renderer.rendered().is_empty());
    }

    #[test]
    fn test_percentage_guards_zero_total() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
