//! OpenMM/PDBFixer subprocess bridge.
//!
//! The scientific work happens in an embedded Python helper driving the
//! external libraries; this module owns process invocation, scratch-file
//! plumbing, and the normalization of helper failures into [`EngineError`].
//! The helper reports failures on stderr as `FORGE_ERROR:<kind>:<message>`
//! lines; anything it does not classify surfaces as
//! [`EngineError::Backend`].

use super::SimulationBackend;
use crate::core::io::pdb::{PdbFile, PdbMetadata};
use crate::core::io::traits::StructureFile;
use crate::core::models::Structure;
use crate::engine::config::{
    ForceFieldSpec, Platform, FRICTION_PER_PS, TEMPERATURE_K, TIMESTEP_PS,
};
use crate::engine::error::EngineError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, warn};

const BRIDGE_SCRIPT: &str = include_str!("../../../assets/openmm_bridge.py");
const ERROR_MARKER: &str = "FORGE_ERROR:";

/// A simulation backend that shells out to OpenMM and PDBFixer.
#[derive(Debug, Clone)]
pub struct OpenMmBridge {
    python: PathBuf,
}

/// A built system held as helper artifacts inside a scoped scratch
/// directory. Dropping it removes the directory.
pub struct BridgeSystem {
    workdir: TempDir,
    solvated_pdb: PathBuf,
    system_xml: PathBuf,
}

/// A helper failure split into its classified kind and message.
struct HelperFailure {
    kind: Option<String>,
    message: String,
}

impl OpenMmBridge {
    /// A bridge using `python3` from `PATH`.
    pub fn new() -> Self {
        Self::with_python(PathBuf::from("python3"))
    }

    /// A bridge using a specific Python interpreter.
    pub fn with_python(python: PathBuf) -> Self {
        Self { python }
    }

    /// Checks whether the interpreter can import the external libraries.
    pub fn available(&self) -> bool {
        Command::new(&self.python)
            .args(["-c", "import openmm, pdbfixer"])
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    /// Materializes the helper script into `workdir` and returns its path.
    fn write_script(workdir: &Path) -> Result<PathBuf, EngineError> {
        let script = workdir.join("openmm_bridge.py");
        std::fs::write(&script, BRIDGE_SCRIPT)?;
        Ok(script)
    }

    /// Runs one helper stage and classifies a failure if there is one.
    fn run_stage(&self, workdir: &Path, args: &[String]) -> Result<(), HelperFailure> {
        let script = match Self::write_script(workdir) {
            Ok(script) => script,
            Err(err) => {
                return Err(HelperFailure {
                    kind: None,
                    message: err.to_string(),
                });
            }
        };

        debug!(stage = %args[0], "Invoking OpenMM bridge helper.");
        let output = Command::new(&self.python)
            .arg(&script)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|e| HelperFailure {
                kind: None,
                message: format!("failed to launch '{}': {}", self.python.display(), e),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(stage = %args[0], "OpenMM bridge helper failed.");
        Err(parse_helper_error(&stderr))
    }
}

impl Default for OpenMmBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBackend for OpenMmBridge {
    type System = BridgeSystem;

    fn repair(&self, input: &Path, ph: f64) -> Result<Structure, EngineError> {
        let workdir = TempDir::new()?;
        let output = workdir.path().join("repaired.pdb");

        let args = vec![
            "repair".to_string(),
            "--input".to_string(),
            input.display().to_string(),
            "--ph".to_string(),
            ph.to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ];
        self.run_stage(workdir.path(), &args)
            .map_err(|failure| match failure.kind.as_deref() {
                Some("parse") => EngineError::StructureParse {
                    path: input.to_path_buf(),
                    message: failure.message,
                },
                Some("repair") => EngineError::Repair {
                    path: input.to_path_buf(),
                    message: failure.message,
                },
                _ => EngineError::Backend(failure.message),
            })?;

        let (structure, _) = PdbFile::read_from_path(&output)
            .map_err(|e| EngineError::Backend(format!("helper wrote unreadable output: {}", e)))?;
        ensure_protonated(&structure, input)?;
        Ok(structure)
    }

    fn solvate_and_build(
        &self,
        repaired: &Structure,
        spec: &ForceFieldSpec,
        padding_nm: f64,
    ) -> Result<Self::System, EngineError> {
        let workdir = TempDir::new()?;
        let input = workdir.path().join("repaired.pdb");
        let solvated_pdb = workdir.path().join("solvated.pdb");
        let system_xml = workdir.path().join("system.xml");

        PdbFile::write_to_path(repaired, &PdbMetadata::default(), &input)
            .map_err(|e| EngineError::Backend(format!("failed to stage structure: {}", e)))?;

        let args = vec![
            "solvate".to_string(),
            "--input".to_string(),
            input.display().to_string(),
            "--forcefield".to_string(),
            spec.force_field().parameter_set().to_string(),
            "--water".to_string(),
            spec.water_model().parameter_set().to_string(),
            "--geometry".to_string(),
            spec.water_model().solvent_geometry().to_string(),
            "--padding".to_string(),
            padding_nm.to_string(),
            "--output-pdb".to_string(),
            solvated_pdb.display().to_string(),
            "--output-system".to_string(),
            system_xml.display().to_string(),
        ];
        self.run_stage(workdir.path(), &args)
            .map_err(|failure| match failure.kind.as_deref() {
                Some("mismatch") => EngineError::ForceFieldMismatch(failure.message),
                _ => EngineError::Backend(failure.message),
            })?;

        Ok(BridgeSystem {
            workdir,
            solvated_pdb,
            system_xml,
        })
    }

    fn minimize(
        &self,
        system: &mut Self::System,
        platform: Platform,
        max_iterations: u32,
    ) -> Result<(Structure, PdbMetadata), EngineError> {
        let output = system.workdir.path().join("minimized.pdb");

        let args = vec![
            "minimize".to_string(),
            "--system".to_string(),
            system.system_xml.display().to_string(),
            "--positions".to_string(),
            system.solvated_pdb.display().to_string(),
            "--platform".to_string(),
            platform.to_string(),
            "--max-iterations".to_string(),
            max_iterations.to_string(),
            "--temperature".to_string(),
            TEMPERATURE_K.to_string(),
            "--friction".to_string(),
            FRICTION_PER_PS.to_string(),
            "--timestep".to_string(),
            TIMESTEP_PS.to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ];
        self.run_stage(system.workdir.path(), &args)
            .map_err(|failure| match failure.kind.as_deref() {
                Some("platform") => EngineError::PlatformUnavailable {
                    platform,
                    message: failure.message,
                },
                Some("diverged") => EngineError::MinimizationDiverged(failure.message),
                _ => EngineError::Backend(failure.message),
            })?;

        let (structure, metadata) = PdbFile::read_from_path(&output)
            .map_err(|e| EngineError::Backend(format!("helper wrote unreadable output: {}", e)))?;
        Ok((structure, metadata))
    }
}

/// Verifies the repair contract: a repaired structure must carry the
/// hydrogens the protonation step added.
fn ensure_protonated(structure: &Structure, input: &Path) -> Result<(), EngineError> {
    if structure.atoms().any(|(_, atom)| atom.is_hydrogen()) {
        return Ok(());
    }
    Err(EngineError::Repair {
        path: input.to_path_buf(),
        message: "repaired structure contains no hydrogens".to_string(),
    })
}

/// Extracts the classified error line from helper stderr, falling back to
/// the raw stderr tail when the helper died before classifying anything.
fn parse_helper_error(stderr: &str) -> HelperFailure {
    for line in stderr.lines().rev() {
        if let Some(rest) = line.strip_prefix(ERROR_MARKER) {
            let (kind, message) = rest.split_once(':').unwrap_or((rest, ""));
            return HelperFailure {
                kind: Some(kind.to_string()),
                message: message.trim().to_string(),
            };
        }
    }
    let tail: String = stderr
        .lines()
        .rev()
        .take(3)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("; ");
    HelperFailure {
        kind: None,
        message: if tail.is_empty() {
            "helper exited with failure and no diagnostics".to_string()
        } else {
            tail
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Atom, Residue};
    use nalgebra::Point3;

    fn alanine(with_hydrogens: bool) -> Structure {
        let mut res = Residue::new("ALA", 'A', 1);
        res.atoms.push(Atom::new("N", "N", Point3::origin()));
        res.atoms
            .push(Atom::new("CA", "C", Point3::new(1.0, 0.0, 0.0)));
        if with_hydrogens {
            res.atoms
                .push(Atom::new("HA", "H", Point3::new(1.5, 0.5, 0.0)));
        }
        Structure::from_residues(vec![res])
    }

    #[test]
    fn protonated_structures_pass_the_repair_check() {
        assert!(ensure_protonated(&alanine(true), Path::new("in.pdb")).is_ok());
    }

    #[test]
    fn hydrogen_free_structures_fail_the_repair_check() {
        let err = ensure_protonated(&alanine(false), Path::new("in.pdb")).unwrap_err();
        assert!(matches!(err, EngineError::Repair { .. }));
    }

    #[test]
    fn classified_error_lines_are_parsed() {
        let stderr = "Traceback (most recent call last):\nFORGE_ERROR:platform:CUDA unavailable\n";
        let failure = parse_helper_error(stderr);
        assert_eq!(failure.kind.as_deref(), Some("platform"));
        assert_eq!(failure.message, "CUDA unavailable");
    }

    #[test]
    fn last_classified_line_wins() {
        let stderr = "FORGE_ERROR:parse:first\nnoise\nFORGE_ERROR:diverged:energy is NaN\n";
        let failure = parse_helper_error(stderr);
        assert_eq!(failure.kind.as_deref(), Some("diverged"));
        assert_eq!(failure.message, "energy is NaN");
    }

    #[test]
    fn unclassified_failures_keep_the_stderr_tail() {
        let failure = parse_helper_error("boom\nsomething broke\n");
        assert!(failure.kind.is_none());
        assert!(failure.message.contains("something broke"));
    }

    #[test]
    fn empty_stderr_yields_a_placeholder_message() {
        let failure = parse_helper_error("");
        assert!(failure.kind.is_none());
        assert!(failure.message.contains("no diagnostics"));
    }

    #[test]
    fn bridge_script_is_embedded() {
        assert!(BRIDGE_SCRIPT.contains("FORGE_ERROR"));
        assert!(BRIDGE_SCRIPT.contains("minimizeEnergy"));
    }
}
