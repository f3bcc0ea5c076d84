use crate::cli::MinimizeArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use proteinforger::engine::backend::openmm::OpenMmBridge;
use proteinforger::engine::outcome::{BatchReport, FileOutcome};
use proteinforger::engine::progress::ProgressReporter;
use proteinforger::workflows::minimize as workflow;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, warn};

pub async fn run(args: MinimizeArgs) -> Result<()> {
    let app = config::build_config(&args)?;
    info!(
        force_field = %app.job.forcefield.force_field(),
        water_model = %app.job.forcefield.water_model(),
        platform = %app.job.platform,
        steps = app.job.max_iterations,
        "Job configuration assembled."
    );

    // Single uploaded files are staged into a scoped temporary directory
    // that outlives the whole batch and is removed afterwards no matter how
    // the batch ends.
    let (inputs, _staging) = resolve_inputs(&args.input)?;
    info!(files = inputs.len(), "Resolved input set.");

    let bridge = match &app.python {
        Some(python) => OpenMmBridge::with_python(python.clone()),
        None => OpenMmBridge::new(),
    };
    if !bridge.available() {
        warn!("The Python interpreter cannot import openmm/pdbfixer; every file will fail.");
        eprintln!(
            "Warning: the simulation engine is not importable; install openmm and pdbfixer."
        );
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.callback());

    println!("Starting minimization batch...");
    let report =
        tokio::task::block_in_place(|| workflow::run(&bridge, &app.job, &inputs, &reporter))?;

    print_summary(&report);
    Ok(())
}

/// Turns the `--input` path into the ordered batch. Directories are listed
/// for `.pdb` files; a single file is copied into a scoped staging
/// directory first.
fn resolve_inputs(input: &Path) -> Result<(Vec<PathBuf>, Option<TempDir>)> {
    if input.is_dir() {
        let files = workflow::collect_structure_files(input)?;
        return Ok((files, None));
    }
    if !input.is_file() {
        return Err(CliError::Argument(format!(
            "input path does not exist: {}",
            input.display()
        )));
    }

    let staging = TempDir::new()?;
    let file_name = input.file_name().ok_or_else(|| {
        CliError::Argument(format!("input path has no file name: {}", input.display()))
    })?;
    let staged = staging.path().join(file_name);
    std::fs::copy(input, &staged)?;
    Ok((vec![staged], Some(staging)))
}

fn print_summary(report: &BatchReport) {
    println!();
    for file_report in &report.reports {
        let name = file_report.input.display();
        match &file_report.outcome {
            FileOutcome::Succeeded { raw, clean } => {
                println!("✓ {}", name);
                println!("    raw:   {}", raw.display());
                println!("    clean: {}", clean.display());
            }
            FileOutcome::Skipped(reason) => {
                println!("- {} (skipped: {})", name, reason.message());
            }
            FileOutcome::Failed(err) => {
                println!("✗ {} ({})", name, err);
            }
        }
    }
    println!("\n{}", report.summary());
}
