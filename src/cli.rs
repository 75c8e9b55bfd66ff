//! Command-line interface definitions and argument parsing

use crate::options::{Bounds, PlotOptions, ReportOptions};
use crate::viz::ChartFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Descriptive statistics and charts over customer transactions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory charts are written to
    #[arg(short, long, default_value = "charts", global = true)]
    pub output_dir: PathBuf,

    /// Image format for charts
    #[arg(long, value_enum, default_value_t = Format::Png, global = true)]
    pub format: Format,

    /// Skip chart rendering
    #[arg(long, global = true)]
    pub no_graph: bool,

    /// Skip the text summary
    #[arg(long, global = true)]
    pub no_text: bool,

    /// X-axis bounds as "min,max", e.g. --bounds "0,500"
    #[arg(short, long, global = true)]
    pub bounds: Option<String>,

    /// Styling override as key=value (repeatable), e.g. --opt color=blue --opt bins=20
    #[arg(long = "opt", global = true)]
    pub opts: Vec<String>,

    /// JSON file of styling overrides; --opt values take precedence
    #[arg(long, global = true)]
    pub plot_options: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Repeat-customer rate from one customer id per transaction
    Frequency {
        /// Comma-separated customer ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        customers: Vec<String>,
    },
    /// Gender breakdown from full customer names
    Gender {
        /// Comma-separated full names
        #[arg(short, long, value_delimiter = ',', required = true)]
        names: Vec<String>,

        /// JSON object mapping first names to oracle tokens
        #[arg(long)]
        name_table: Option<PathBuf>,
    },
    /// Summary statistics of transaction amounts
    Average {
        /// Comma-separated transaction amounts
        #[arg(short, long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        amounts: Vec<f64>,
    },
    /// Lifetime value per customer
    Lifetime {
        /// Comma-separated customer ids, one per transaction
        #[arg(short, long, value_delimiter = ',', required = true)]
        customers: Vec<String>,

        /// Comma-separated transaction amounts, aligned with --customers
        #[arg(short, long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        amounts: Vec<f64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Svg,
}

impl From<Format> for ChartFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ChartFormat::Png,
            Format::Svg => ChartFormat::Svg,
        }
    }
}

impl Args {
    /// Parse the bounds string
    /// Expected format: "min,max"
    pub fn parse_bounds(&self) -> crate::Result<Option<Bounds>> {
        if let Some(ref bounds_str) = self.bounds {
            let parts: Vec<&str> = bounds_str.split(',').collect();
            if parts.len() != 2 {
                anyhow::bail!("Bounds must be in format 'min,max'");
            }

            let min: f64 = parts[0]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid lower bound: {}", parts[0]))?;
            let max: f64 = parts[1]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid upper bound: {}", parts[1]))?;

            Ok(Some(Bounds::new(min, max)?))
        } else {
            Ok(None)
        }
    }

    /// Collect styling overrides from --plot-options and --opt
    pub fn parse_plot_options(&self) -> crate::Result<PlotOptions> {
        let mut options = match self.plot_options {
            Some(ref path) => PlotOptions::from_json_file(path)?,
            None => PlotOptions::new(),
        };

        for pair in &self.opts {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Plot option must be key=value: {}", pair))?;
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("Plot option has an empty key: {}", pair);
            }
            options.insert(key, value.trim());
        }

        Ok(options)
    }

    pub fn report_options(&self) -> crate::Result<ReportOptions> {
        Ok(ReportOptions {
            graph: !self.no_graph,
            text: !self.no_text,
            bounds: self.parse_bounds()?,
            plot_options: self.parse_plot_options()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: Command) -> Args {
        Args {
            output_dir: PathBuf::from("charts"),
            format: Format::Png,
            no_graph: false,
            no_text: false,
            bounds: None,
            opts: Vec::new(),
            plot_options: None,
            verbose: false,
            command,
        }
    }

    #[test]
    fn test_parse_bounds() {
        let mut args = args(Command::Average {
            amounts: vec![1.0],
        });

        args.bounds = Some("0, 250.5".to_string());
        let bounds = args.parse_bounds().unwrap().unwrap();
        assert_eq!((bounds.min(), bounds.max()), (0.0, 250.5));

        args.bounds = None;
        assert!(args.parse_bounds().unwrap().is_none());

        args.bounds = Some("invalid".to_string());
        assert!(args.parse_bounds().is_err());

        args.bounds = Some("10,1".to_string());
        assert!(args.parse_bounds().is_err());
    }

    #[test]
    fn test_parse_plot_options() {
        let mut args = args(Command::Frequency {
            customers: vec!["a".to_string()],
        });
        args.opts = vec!["color=blue".to_string(), " bins = 20".to_string()];

        let options = args.parse_plot_options().unwrap();
        assert_eq!(options.get("color"), Some("blue"));
        assert_eq!(options.get("bins"), Some("20"));

        args.opts = vec!["novalue".to_string()];
        assert!(args.parse_plot_options().is_err());

        args.opts = vec!["=red".to_string()];
        assert!(args.parse_plot_options().is_err());
    }

    #[test]
    fn test_plot_options_file_then_flags() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"color": "red", "bins": 12}"#).unwrap();

        let mut args = args(Command::Frequency {
            customers: vec!["a".to_string()],
        });
        args.plot_options = Some(file.path().to_path_buf());
        args.opts = vec!["color=green".to_string()];

        let options = args.parse_plot_options().unwrap();
        assert_eq!(options.get("color"), Some("green"));
        assert_eq!(options.get("bins"), Some("12"));
    }

    #[test]
    fn test_command_line_parsing() {
        let args = Args::try_parse_from([
            "custlens",
            "--no-graph",
            "lifetime",
            "--customers",
            "A,A,B",
            "--amounts",
            "10,20,5",
        ])
        .unwrap();

        let options = args.report_options().unwrap();
        assert!(!options.graph);
        assert!(options.text);
        match args.command {
            Command::Lifetime { customers, amounts } => {
                assert_eq!(customers, vec!["A", "A", "B"]);
                assert_eq!(amounts, vec![10.0, 20.0, 5.0]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
