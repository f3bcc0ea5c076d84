//! The adapter seam between the orchestrator and the external simulation
//! engine.
//!
//! The three operations mirror the three preparation stages: atom repair,
//! solvation + system construction, and energy minimization. The built
//! system is an opaque associated type because only the backend that built
//! it can minimize it; the orchestrator never inspects it.
//!
//! [`openmm`] provides the production implementation (OpenMM + PDBFixer via
//! a subprocess bridge); tests substitute lightweight mocks.

pub mod openmm;

use super::config::{ForceFieldSpec, Platform};
use super::error::EngineError;
use crate::core::io::pdb::PdbMetadata;
use crate::core::models::Structure;
use std::path::Path;

/// The contract every simulation backend fulfills.
///
/// All three methods normalize their library's failures into
/// [`EngineError`]; no backend-native error type escapes this boundary.
pub trait SimulationBackend {
    /// An opaque, simulatable system owning the combined
    /// protein+water+ion topology and interaction parameters.
    type System;

    /// Repairs a raw structure file: finds and adds missing residues and
    /// heavy atoms, then adds hydrogens appropriate to `ph`.
    ///
    /// The result has no missing heavy atoms and hydrogens present.
    ///
    /// # Errors
    ///
    /// [`EngineError::StructureParse`] if the file is not a valid
    /// structure; [`EngineError::Repair`] if atom completion fails.
    fn repair(&self, input: &Path, ph: f64) -> Result<Structure, EngineError>;

    /// Adds an explicit water shell with `padding_nm` nanometers of padding
    /// around the solute, then builds a system under the given force field
    /// using PME electrostatics.
    ///
    /// # Errors
    ///
    /// [`EngineError::ForceFieldMismatch`] if the structure contains
    /// residues or atoms unknown to the force field.
    fn solvate_and_build(
        &self,
        repaired: &Structure,
        spec: &ForceFieldSpec,
        padding_nm: f64,
    ) -> Result<Self::System, EngineError>;

    /// Runs iterative energy minimization on a built system, for up to
    /// `max_iterations` steps, and returns the final coordinates (solvent
    /// and ions included) together with the periodic box record, so the
    /// persisted raw output keeps the solvent box geometry.
    ///
    /// # Errors
    ///
    /// [`EngineError::PlatformUnavailable`] if the requested platform
    /// cannot be instantiated; [`EngineError::MinimizationDiverged`] if the
    /// engine reports non-finite energy.
    fn minimize(
        &self,
        system: &mut Self::System,
        platform: Platform,
        max_iterations: u32,
    ) -> Result<(Structure, PdbMetadata), EngineError>;
}
