mod cli;

use clap::Parser;
use cli::{duplicate_label, missing_label, Cli};
use codesort_core::{
    BarObserver, CancelFlag, Classifier, ConsoleReporter, JsonReporter, PathListReporter,
    Preferences, UnresolvedReporter,
};
use indicatif::ProgressBar;
use std::error::Error;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Conventional status for a process ended by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let preferences = match &cli.config {
        Some(path) => Preferences::load(path)?,
        None => Preferences::load_or_default(),
    };
    let config = cli
        .apply(preferences)
        .into_run_configuration(cli.source.clone(), cli.target.clone())?;

    tracing::info!(
        duplicates = duplicate_label(config.duplicate_policy),
        missing = missing_label(config.missing_policy),
        restriction = ?config.format_restriction,
        try_harder = config.high_effort,
        "run configuration"
    );

    let cancel = CancelFlag::new();
    let handler = cancel.clone();
    let interrupt = move || {
        if handler.cancel() {
            eprintln!("Interrupted again, exiting");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        eprintln!("Canceling after the current image, press Ctrl-C again to quit");
    };
    if let Err(error) = ctrlc::set_handler(interrupt) {
        tracing::warn!(%error, "Ctrl-C will not cancel the run");
    }

    let target_dir = config.target_dir.clone();
    let observer = BarObserver::new(ProgressBar::new(0), cancel);
    let result = Classifier::with_defaults(config).run(&observer)?;

    let mut reporters: Vec<Box<dyn UnresolvedReporter>> = vec![Box::new(ConsoleReporter)];
    if let Some(path) = &cli.report_json {
        reporters.push(Box::new(JsonReporter::new(path)));
    }
    if let Some(path) = &cli.unresolved_list {
        reporters.push(Box::new(PathListReporter::new(path)));
    }
    for reporter in reporters.iter_mut() {
        if let Err(error) = reporter.report(&result) {
            eprintln!("Error writing report: {}", error);
        }
    }

    println!("Renamed images written to {}", target_dir.display());
    Ok(())
}
