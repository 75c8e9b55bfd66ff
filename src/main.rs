//! custlens: customer transaction reports from the command line
//!
//! Parses the arguments, builds the report context and runs one report.

use anyhow::Result;
use clap::Parser;
use custlens::cli::Command;
use custlens::{
    average_purchase, gender_breakdown, lifetime_value, purchase_frequency, Args,
    NameTableOracle, PlottersRenderer, ReportContext,
};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let options = args.report_options()?;
    let renderer = PlottersRenderer::new(&args.output_dir, args.format.into());
    let mut ctx = ReportContext::stdout(renderer);

    match &args.command {
        Command::Frequency { customers } => {
            purchase_frequency(customers, &options, &mut ctx)?;
        }
        Command::Gender { names, name_table } => {
            let oracle = match name_table {
                Some(path) => NameTableOracle::from_json_file(path)?,
                None => {
                    log::warn!("no --name-table given, every name will be Andro/Unknown");
                    NameTableOracle::new()
                }
            };
            gender_breakdown(names, &oracle, &options, &mut ctx)?;
        }
        Command::Average { amounts } => {
            average_purchase(amounts, &options, &mut ctx)?;
        }
        Command::Lifetime { customers, amounts } => {
            lifetime_value(customers, amounts, &options, &mut ctx)?;
        }
    }

    let (_, renderer) = ctx.into_parts();
    for path in renderer.rendered() {
        println!("Chart saved to: {}", path.display());
    }

    Ok(())
}
