use clap::Parser;
use indelscan::{run_indelscan, Args};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    log::info!("starting indelscan {}", env!("CARGO_PKG_VERSION"));
    let outcome = run_indelscan(&args)?;

    let report = &outcome.report;
    log::info!(
        "done: {}/{} samples processed, summary in {}",
        report.samples_processed,
        report.samples_unique,
        outcome.paths.summary.display()
    );
    Ok(())
}
