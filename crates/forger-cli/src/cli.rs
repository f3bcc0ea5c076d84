use clap::{Args, Parser, Subcommand, ValueEnum};
use proteinforger::engine::config::{ForceField, Platform, WaterModel};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "ProteinForger Developers",
    version,
    about = "ProteinForger CLI - Repair, solvate, and energy-minimize protein structures through an external molecular-simulation engine.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Repair, solvate, and energy-minimize one PDB file or a directory of PDB files.
    Minimize(MinimizeArgs),
}

/// Arguments for the `minimize` subcommand.
#[derive(Args, Debug)]
pub struct MinimizeArgs {
    /// Path to a single PDB file, or a directory whose .pdb files form the batch.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Output root directory; each input gets its own subdirectory under it.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to a job configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the protein force field from the config file.
    #[arg(short = 'f', long, value_enum, value_name = "NAME")]
    pub force_field: Option<ForceFieldArg>,

    /// Override the water model. Must match the force field's pairing;
    /// omit it to use the compatible model automatically.
    #[arg(short = 'w', long, value_enum, value_name = "NAME")]
    pub water_model: Option<WaterModelArg>,

    /// Override the compute platform from the config file.
    #[arg(short = 'p', long, value_enum, value_name = "NAME")]
    pub platform: Option<PlatformArg>,

    /// Override the minimization iteration cap (default 100).
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<u32>,

    /// Python interpreter used to reach the simulation engine.
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceFieldArg {
    Charmm36,
    Amber14,
}

impl From<ForceFieldArg> for ForceField {
    fn from(arg: ForceFieldArg) -> Self {
        match arg {
            ForceFieldArg::Charmm36 => ForceField::Charmm36,
            ForceFieldArg::Amber14 => ForceField::Amber14,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterModelArg {
    /// The CHARMM-modified TIP3P water shipped with CHARMM36.
    CharmmWater,
    /// TIP3P-FB, paired with AMBER-14.
    Tip3pFb,
}

impl From<WaterModelArg> for WaterModel {
    fn from(arg: WaterModelArg) -> Self {
        match arg {
            WaterModelArg::CharmmWater => WaterModel::CharmmWater,
            WaterModelArg::Tip3pFb => WaterModel::Tip3pFb,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformArg {
    Cpu,
    Cuda,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Cpu => Platform::Cpu,
            PlatformArg::Cuda => Platform::Cuda,
        }
    }
}
