//! Job configuration assembly: TOML file values merged with CLI overrides.
//!
//! Precedence is CLI argument > config file > built-in default. The
//! defaults mirror the original tool's recommendations: CHARMM36 with its
//! matching water model, CPU platform, 100 minimization steps.

use crate::cli::MinimizeArgs;
use crate::error::{CliError, Result};
use proteinforger::engine::config::{
    ForceField, ForceFieldSpec, JobConfig, JobConfigBuilder, Platform, WaterModel,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything the `minimize` command needs beyond its input paths.
#[derive(Debug)]
pub struct AppConfig {
    pub job: JobConfig,
    pub python: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub force_field: Option<ForceField>,
    pub water_model: Option<WaterModel>,
    pub platform: Option<Platform>,
    pub steps: Option<u32>,
    pub python: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&text)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded job configuration file.");
        Ok(config)
    }
}

/// Merges the config file (if any) with CLI overrides into a validated
/// [`JobConfig`].
pub fn build_config(args: &MinimizeArgs) -> Result<AppConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let force_field: ForceField = args
        .force_field
        .map(Into::into)
        .or(file_config.force_field)
        .unwrap_or(ForceField::Charmm36);

    let forcefield = match args.water_model.map(Into::into).or(file_config.water_model) {
        Some(water_model) => ForceFieldSpec::new(force_field, water_model)
            .map_err(|e| CliError::Config(e.to_string()))?,
        None => ForceFieldSpec::with_default_water(force_field),
    };

    let platform: Platform = args
        .platform
        .map(Into::into)
        .or(file_config.platform)
        .unwrap_or(Platform::Cpu);

    let mut builder = JobConfigBuilder::new()
        .forcefield(forcefield)
        .platform(platform)
        .output_root(args.output.clone());
    if let Some(steps) = args.steps.or(file_config.steps) {
        builder = builder.max_iterations(steps);
    }
    let job = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        job,
        python: args.python.clone().or(file_config.python),
    })
}
