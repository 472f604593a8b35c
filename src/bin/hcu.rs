//! hcu - Helm chart updater CLI
//!
//! Walks the configured chart directories, pins governed dependencies to
//! their target version, and migrates each chart's values file through the
//! catalog's version-gated change-sets.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use helm_chart_updater::{
    discover_charts, ChangeCatalog, ChartError, ChartFile, ChartRequirement, Config,
    MutationApplier, ValuesFile,
};

#[derive(Debug, Parser)]
#[command(
    name = "hcu",
    version,
    about = "Update Helm chart and values files based on version requirements"
)]
struct Cli {
    /// Path of the file that contains the version changes
    #[arg(short = 'f', long = "file", default_value = "./version_changes.yaml")]
    config: PathBuf,

    /// Print debug logs. Overrides --quiet
    #[arg(short, long)]
    verbose: bool,

    /// Do not print info logs
    #[arg(short, long)]
    quiet: bool,

    /// Also append logs to this file
    #[arg(short = 'l', long = "log-file")]
    log_file: Option<PathBuf>,
}

fn init_logging(cli: &Cli) -> std::io::Result<()> {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false));
    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();
        }
        None => registry.init(),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("could not open log file: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}: {}", cli.config.display(), render_chain(&e));
            return ExitCode::FAILURE;
        }
    };

    let applier = MutationApplier::new();
    let mut chart_errors = 0usize;
    for chart_path in discover_charts(&config.chart_roots) {
        for requirement in &config.requirements {
            if let Err(e) = process_chart(&applier, &chart_path, requirement, &config.catalog) {
                error!(chart = %chart_path.display(), "{}", render_chain(&e));
                chart_errors += 1;
            }
        }
    }

    if chart_errors > 0 {
        warn!("{} chart(s) could not be processed", chart_errors);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn process_chart(
    applier: &MutationApplier,
    chart_path: &Path,
    requirement: &ChartRequirement,
    catalog: &ChangeCatalog,
) -> Result<(), ChartError> {
    let mut chart = ChartFile::load(chart_path)?;
    let Some(current) = chart.dependency_version(&requirement.chart_name)? else {
        info!(
            "{} dependency not found in the {} file",
            requirement.chart_name,
            chart_path.display()
        );
        return Ok(());
    };

    let in_range =
        current >= requirement.min_version && current <= requirement.max_version;
    if !in_range {
        info!(
            "chart version {} not eligible for the requirements {} <= v <= {} at {}",
            current,
            requirement.min_version,
            requirement.max_version,
            chart_path.display()
        );
    } else if chart.set_dependency_version(&requirement.chart_name, &requirement.update_to_version)
    {
        chart.save()?;
        info!(
            "chart {} updated to {} version",
            requirement.chart_name, requirement.update_to_version
        );
    } else {
        info!(
            "chart {} is already at the desired version {}",
            requirement.chart_name, requirement.update_to_version
        );
    }

    let values_path = chart_path
        .parent()
        .map(|dir| dir.join("values.yaml"))
        .unwrap_or_else(|| PathBuf::from("values.yaml"));
    let mut values = ValuesFile::load(&values_path)?;

    let report = applier.migrate(values.document_mut(), &current, requirement, catalog);
    if report.applied() > 0 {
        values.save()?;
    }
    info!(
        "{}: {} applied, {} skipped, {} failed, now at {}",
        values_path.display(),
        report.applied(),
        report.skipped(),
        report.failed(),
        report.effective_version
    );
    Ok(())
}

// Renders an error with its source chain, innermost last.
fn render_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
