use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Target pH used when adding missing hydrogens.
pub const TARGET_PH: f64 = 7.0;
/// Padding distance around the solute for the water box, in nanometers.
pub const SOLVENT_PADDING_NM: f64 = 1.0;
/// Thermostat temperature for the integrator, in Kelvin. The integrator is
/// only used to initialize the simulation context; no timesteps are taken.
pub const TEMPERATURE_K: f64 = 300.0;
/// Langevin friction coefficient, in 1/ps.
pub const FRICTION_PER_PS: f64 = 1.0;
/// Integrator timestep, in ps.
pub const TIMESTEP_PS: f64 = 0.002;
/// Default minimization iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Water model {water_model} is not compatible with force field {force_field}")]
    IncompatibleWaterModel {
        force_field: ForceField,
        water_model: WaterModel,
    },

    #[error("Minimization iteration cap must be at least 1")]
    InvalidIterationCap,
}

/// Supported protein force fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForceField {
    Charmm36,
    Amber14,
}

impl ForceField {
    /// The engine-side parameter set identifier for this force field.
    pub fn parameter_set(&self) -> &'static str {
        match self {
            ForceField::Charmm36 => "charmm36.xml",
            ForceField::Amber14 => "amber14/protein.ff14SB.xml",
        }
    }

    /// The only water model each force field may be paired with.
    pub fn compatible_water_model(&self) -> WaterModel {
        match self {
            ForceField::Charmm36 => WaterModel::CharmmWater,
            ForceField::Amber14 => WaterModel::Tip3pFb,
        }
    }
}

impl fmt::Display for ForceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceField::Charmm36 => write!(f, "CHARMM36"),
            ForceField::Amber14 => write!(f, "AMBER-14"),
        }
    }
}

/// Supported explicit water models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaterModel {
    /// The CHARMM-modified TIP3P water shipped with CHARMM36.
    CharmmWater,
    /// TIP3P-FB, the force-balance refit used with AMBER-14SB.
    Tip3pFb,
}

impl WaterModel {
    /// The engine-side parameter set identifier for this water model.
    pub fn parameter_set(&self) -> &'static str {
        match self {
            WaterModel::CharmmWater => "charmm36/water.xml",
            WaterModel::Tip3pFb => "amber14/tip3pfb.xml",
        }
    }

    /// The solvent geometry name passed to the solvation call. Both
    /// supported models use three-site TIP3P geometry.
    pub fn solvent_geometry(&self) -> &'static str {
        "tip3p"
    }
}

impl fmt::Display for WaterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaterModel::CharmmWater => write!(f, "CHARMM/water"),
            WaterModel::Tip3pFb => write!(f, "TIP3P-FB"),
        }
    }
}

/// A validated force field + water model pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceFieldSpec {
    force_field: ForceField,
    water_model: WaterModel,
}

impl ForceFieldSpec {
    /// Pairs a force field with a water model, rejecting incompatible
    /// combinations.
    pub fn new(force_field: ForceField, water_model: WaterModel) -> Result<Self, ConfigError> {
        if force_field.compatible_water_model() != water_model {
            return Err(ConfigError::IncompatibleWaterModel {
                force_field,
                water_model,
            });
        }
        Ok(Self {
            force_field,
            water_model,
        })
    }

    /// Pairs a force field with its compatible water model.
    pub fn with_default_water(force_field: ForceField) -> Self {
        Self {
            force_field,
            water_model: force_field.compatible_water_model(),
        }
    }

    pub fn force_field(&self) -> ForceField {
        self.force_field
    }

    pub fn water_model(&self) -> WaterModel {
        self.water_model
    }
}

/// Named compute platform for the simulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Cpu,
    Cuda,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Cpu => write!(f, "CPU"),
            Platform::Cuda => write!(f, "CUDA"),
        }
    }
}

/// Immutable configuration for one minimization batch.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub forcefield: ForceFieldSpec,
    pub platform: Platform,
    pub max_iterations: u32,
    pub output_root: PathBuf,
}

#[derive(Default)]
pub struct JobConfigBuilder {
    forcefield: Option<ForceFieldSpec>,
    platform: Option<Platform>,
    max_iterations: Option<u32>,
    output_root: Option<PathBuf>,
}

impl JobConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forcefield(mut self, spec: ForceFieldSpec) -> Self {
        self.forcefield = Some(spec);
        self
    }
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }
    pub fn max_iterations(mut self, cap: u32) -> Self {
        self.max_iterations = Some(cap);
        self
    }
    pub fn output_root(mut self, path: PathBuf) -> Self {
        self.output_root = Some(path);
        self
    }

    pub fn build(self) -> Result<JobConfig, ConfigError> {
        let max_iterations = self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(ConfigError::InvalidIterationCap);
        }
        Ok(JobConfig {
            forcefield: self
                .forcefield
                .ok_or(ConfigError::MissingParameter("forcefield"))?,
            platform: self.platform.unwrap_or(Platform::Cpu),
            max_iterations,
            output_root: self
                .output_root
                .ok_or(ConfigError::MissingParameter("output_root"))?,
        })
    }
}
