//! Chart specifications and the renderers that draw them using Plotters

use crate::error::{ReportError, ReportResult};
use crate::options::{Bounds, PlotOptions};
use crate::stats::{histogram, Bins, MAX_BINS};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::PathBuf;

/// ggplot-style panel background
const PANEL_BACKGROUND: RGBColor = RGBColor(229, 229, 229);

/// ggplot-style default fill
const DEFAULT_FILL: RGBColor = RGBColor(226, 74, 51);

/// Option keys the Plotters renderer understands
const KNOWN_OPTIONS: [&str; 6] = ["color", "alpha", "bins", "width", "height", "title_size"];

/// What kind of chart to draw, with the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// Histogram of raw values
    Histogram { values: Vec<f64>, bins: Bins },
    /// One bar per label, drawn in the given order
    Bar {
        labels: Vec<String>,
        heights: Vec<f64>,
    },
}

/// Declarative description of a single chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub bounds: Option<Bounds>,
    pub options: PlotOptions,
}

impl PlotSpec {
    pub fn histogram(title: &str, x_label: &str, values: Vec<f64>, bins: Bins) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: "Frequency".to_string(),
            kind: ChartKind::Histogram { values, bins },
            bounds: None,
            options: PlotOptions::new(),
        }
    }

    pub fn bar(title: &str, y_label: &str, labels: Vec<String>, heights: Vec<f64>) -> Self {
        Self {
            title: title.to_string(),
            x_label: String::new(),
            y_label: y_label.to_string(),
            kind: ChartKind::Bar { labels, heights },
            bounds: None,
            options: PlotOptions::new(),
        }
    }

    /// Axis bounds only apply to histograms; bar charts ignore them.
    pub fn with_bounds(mut self, bounds: Option<Bounds>) -> Self {
        match self.kind {
            ChartKind::Histogram { .. } => self.bounds = bounds,
            ChartKind::Bar { .. } => {
                if bounds.is_some() {
                    log::debug!("'{}': bar charts ignore axis bounds", self.title);
                }
            }
        }
        self
    }

    pub fn with_options(mut self, options: PlotOptions) -> Self {
        self.options.extend(options);
        self
    }

    /// File-name friendly version of the title.
    pub fn file_stem(&self) -> String {
        let slug: Vec<String> = self
            .title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if slug.is_empty() {
            "chart".to_string()
        } else {
            slug.join("_")
        }
    }
}

/// Something that can turn a [`PlotSpec`] into a chart.
pub trait ChartRenderer {
    /// Check that `spec` can be rendered, without producing any output.
    fn validate(&self, _spec: &PlotSpec) -> ReportResult<()> {
        Ok(())
    }

    fn render(&mut self, spec: &PlotSpec) -> ReportResult<()>;
}

impl<R: ChartRenderer + ?Sized> ChartRenderer for &mut R {
    fn validate(&self, spec: &PlotSpec) -> ReportResult<()> {
        (**self).validate(spec)
    }

    fn render(&mut self, spec: &PlotSpec) -> ReportResult<()> {
        (**self).render(spec)
    }
}

/// Keeps every spec it is given instead of drawing it.
#[derive(Debug, Default)]
pub struct CollectingRenderer {
    pub specs: Vec<PlotSpec>,
}

impl CollectingRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartRenderer for CollectingRenderer {
    fn render(&mut self, spec: &PlotSpec) -> ReportResult<()> {
        self.specs.push(spec.clone());
        Ok(())
    }
}

/// Output image format for [`PlottersRenderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

/// Draws charts to image files, one file per chart, named after the title.
#[derive(Debug)]
pub struct PlottersRenderer {
    output_dir: PathBuf,
    format: ChartFormat,
    rendered: Vec<PathBuf>,
}

impl PlottersRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, format: ChartFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            rendered: Vec::new(),
        }
    }

    /// Paths of every chart written so far
    pub fn rendered(&self) -> &[PathBuf] {
        &self.rendered
    }

    pub fn output_path(&self, spec: &PlotSpec) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", spec.file_stem(), self.format.extension()))
    }
}

impl ChartRenderer for PlottersRenderer {
    fn validate(&self, spec: &PlotSpec) -> ReportResult<()> {
        let style = ChartStyle::from_options(&spec.options)?;
        if let ChartKind::Histogram { values, bins } = &spec.kind {
            histogram(values, &style.histogram_bins(bins))?;
        }
        Ok(())
    }

    fn render(&mut self, spec: &PlotSpec) -> ReportResult<()> {
        let style = ChartStyle::from_options(&spec.options)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(spec);

        // Each chart gets its own drawing area, released when it goes out of scope
        match self.format {
            ChartFormat::Png => {
                let root = BitMapBackend::new(&path, style.size).into_drawing_area();
                draw_chart(&root, spec, &style)?;
                root.present()?;
            }
            ChartFormat::Svg => {
                let root = SVGBackend::new(&path, style.size).into_drawing_area();
                draw_chart(&root, spec, &style)?;
                root.present()?;
            }
        }

        log::info!("'{}' chart saved to: {}", spec.title, path.display());
        self.rendered.push(path);
        Ok(())
    }
}

/// Resolved styling for one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub color: RGBColor,
    pub alpha: f64,
    pub bins: Option<usize>,
    pub size: (u32, u32),
    pub title_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_FILL,
            alpha: 1.0,
            bins: None,
            size: (1280, 960),
            title_size: 48,
        }
    }
}

impl ChartStyle {
    pub fn from_options(options: &PlotOptions) -> ReportResult<Self> {
        let defaults = Self::default();

        for (key, value) in options.iter() {
            if !KNOWN_OPTIONS.contains(&key) {
                log::debug!("ignoring unsupported plot option {}={}", key, value);
            }
        }

        let color = match options.get("color") {
            Some(raw) => parse_color(raw)?,
            None => defaults.color,
        };

        let alpha = options.parse::<f64>("alpha")?.unwrap_or(defaults.alpha);
        if !(0.0..=1.0).contains(&alpha) {
            return Err(invalid_option("alpha", &alpha.to_string(), "must lie in 0..=1"));
        }

        let bins = options.parse::<usize>("bins")?;
        if let Some(n) = bins {
            if n == 0 || n > MAX_BINS {
                return Err(invalid_option(
                    "bins",
                    &n.to_string(),
                    &format!("must lie in 1..={}", MAX_BINS),
                ));
            }
        }

        let width = options.parse::<u32>("width")?.unwrap_or(defaults.size.0);
        let height = options.parse::<u32>("height")?.unwrap_or(defaults.size.1);
        if width == 0 || height == 0 {
            return Err(invalid_option(
                "width/height",
                &format!("{}x{}", width, height),
                "chart dimensions must be positive",
            ));
        }

        let title_size = options
            .parse::<u32>("title_size")?
            .unwrap_or(defaults.title_size);

        Ok(Self {
            color,
            alpha,
            bins,
            size: (width, height),
            title_size,
        })
    }

    /// Bins for a histogram, honouring a `bins` override.
    pub fn histogram_bins(&self, default: &Bins) -> Bins {
        self.bins.map(Bins::Count).unwrap_or_else(|| default.clone())
    }
}

/// Parse a colour given by name or as `#rrggbb`.
pub fn parse_color(raw: &str) -> ReportResult<RGBColor> {
    let value = raw.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(rgb) = u32::from_str_radix(hex, 16) {
                return Ok(RGBColor((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8));
            }
        }
        return Err(invalid_option("color", raw, "expected #rrggbb"));
    }

    match value.as_str() {
        "red" => Ok(RED),
        "green" => Ok(GREEN),
        "blue" => Ok(BLUE),
        "black" => Ok(BLACK),
        "yellow" => Ok(YELLOW),
        "magenta" => Ok(MAGENTA),
        "cyan" => Ok(CYAN),
        "white" => Ok(WHITE),
        "gray" | "grey" => Ok(RGBColor(128, 128, 128)),
        "orange" => Ok(RGBColor(255, 165, 0)),
        "purple" => Ok(RGBColor(128, 0, 128)),
        _ => Err(invalid_option("color", raw, "unknown colour name")),
    }
}

fn invalid_option(key: &str, value: &str, reason: &str) -> ReportError {
    ReportError::InvalidPlotOption {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &PlotSpec,
    style: &ChartStyle,
) -> ReportResult<()> {
    root.fill(&WHITE)?;
    match &spec.kind {
        ChartKind::Histogram { values, bins } => draw_histogram(root, spec, values, bins, style),
        ChartKind::Bar { labels, heights } => draw_bars(root, spec, labels, heights, style),
    }
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &PlotSpec,
    values: &[f64],
    bins: &Bins,
    style: &ChartStyle,
) -> ReportResult<()> {
    let counts = histogram(values, &style.histogram_bins(bins))?;

    let (x_min, x_max) = match spec.bounds {
        Some(bounds) => (bounds.min(), bounds.max()),
        None => (
            counts.first().map_or(0.0, |b| b.lower),
            counts.last().map_or(1.0, |b| b.upper),
        ),
    };
    let tallest = counts.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let y_max = tallest as f64 * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", style.title_size))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

    chart.plotting_area().fill(&PANEL_BACKGROUND)?;
    chart
        .configure_mesh()
        .bold_line_style(&WHITE)
        .light_line_style(&WHITE.mix(0.5))
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .axis_desc_style(("sans-serif", 24))
        .draw()?;

    let fill = style.color.mix(style.alpha).filled();
    chart.draw_series(counts.iter().filter_map(|bin| {
        // Clip bars to the visible range
        let lower = bin.lower.max(x_min);
        let upper = bin.upper.min(x_max);
        (lower < upper && bin.count > 0)
            .then(|| Rectangle::new([(lower, 0.0), (upper, bin.count as f64)], fill))
    }))?;

    Ok(())
}

fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &PlotSpec,
    labels: &[String],
    heights: &[f64],
    style: &ChartStyle,
) -> ReportResult<()> {
    let n_bars = labels.len() as u32;
    let y_max = heights.iter().copied().fold(0.0, f64::max).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", style.title_size))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..n_bars).into_segmented(), 0f64..y_max)?;

    let label_of = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart.plotting_area().fill(&PANEL_BACKGROUND)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(&WHITE)
        .light_line_style(&WHITE.mix(0.5))
        .x_labels(labels.len())
        .x_label_formatter(&label_of)
        .y_desc(spec.y_label.as_str())
        .axis_desc_style(("sans-serif", 24))
        .draw()?;

    let fill = style.color.mix(style.alpha).filled();
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(fill)
            .margin(40)
            .data(heights.iter().enumerate().map(|(i, h)| (i as u32, *h))),
    )?;

    Ok(())
}
