//! The batch minimization workflow.
//!
//! Each input file moves through a strictly sequential state machine:
//! validate extension, repair, solvate and build, minimize, persist the raw
//! solvated result, strip heterogens, persist the clean result. A failure
//! anywhere is recorded as that file's outcome and the batch moves on; only
//! an empty input set aborts the batch, and it does so before any file is
//! touched.

use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::engine::backend::SimulationBackend;
use crate::engine::config::{JobConfig, SOLVENT_PADDING_NM, TARGET_PH};
use crate::engine::error::EngineError;
use crate::engine::outcome::{BatchReport, FileOutcome, SkipReason};
use crate::engine::progress::{Progress, ProgressReporter, Stage};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

const STRUCTURE_EXTENSION: &str = "pdb";
const RAW_SUFFIX: &str = "_minimized_raw.pdb";
const CLEAN_SUFFIX: &str = "_minimized_clean.pdb";

/// Runs the minimization pipeline over `inputs`, in order.
///
/// Returns one outcome per input. The batch never aborts on a per-file
/// failure; it aborts only when the input set resolves to zero structure
/// files, in which case nothing has been processed or written.
///
/// # Errors
///
/// [`EngineError::EmptyInputSet`] if `inputs` is empty or contains no
/// `.pdb` path.
#[instrument(skip_all, name = "minimization_workflow")]
pub fn run<B: SimulationBackend>(
    backend: &B,
    config: &JobConfig,
    inputs: &[PathBuf],
    reporter: &ProgressReporter,
) -> Result<BatchReport, EngineError> {
    if !inputs.iter().any(|path| is_structure_file(path)) {
        return Err(EngineError::EmptyInputSet);
    }

    info!(
        files = inputs.len(),
        force_field = %config.forcefield.force_field(),
        water_model = %config.forcefield.water_model(),
        platform = %config.platform,
        max_iterations = config.max_iterations,
        "Starting minimization batch."
    );
    reporter.report(Progress::BatchStart {
        total_files: inputs.len() as u64,
    });

    let mut report = BatchReport::default();
    for input in inputs {
        let name = display_name(input);

        if !is_structure_file(input) {
            let reason = SkipReason::InvalidExtension;
            warn!(file = %name, "Skipping input: {}", reason.message());
            reporter.report(Progress::FileSkipped {
                name,
                reason: reason.message().to_string(),
            });
            report.push(input.clone(), FileOutcome::Skipped(reason));
            continue;
        }

        match process_file(backend, config, input, reporter) {
            Ok((raw, clean)) => {
                info!(file = %name, "File completed.");
                reporter.report(Progress::FileSucceeded { name });
                report.push(input.clone(), FileOutcome::Succeeded { raw, clean });
            }
            Err(err) => {
                warn!(file = %name, error = %err, "File failed; batch continues.");
                reporter.report(Progress::FileFailed {
                    name,
                    message: err.to_string(),
                });
                report.push(input.clone(), FileOutcome::Failed(err));
            }
        }
    }

    info!("Batch finished: {}.", report.summary());
    reporter.report(Progress::Message(
        "All files have been processed !".to_string(),
    ));
    reporter.report(Progress::BatchFinish);
    Ok(report)
}

/// Drives one file through repair, solvation, minimization, and the
/// two-stage persistence, returning the raw/clean output paths.
fn process_file<B: SimulationBackend>(
    backend: &B,
    config: &JobConfig,
    input: &Path,
    reporter: &ProgressReporter,
) -> Result<(PathBuf, PathBuf), EngineError> {
    let name = display_name(input);
    info!(file = %name, "Loading structure.");
    reporter.report(Progress::FileStart { name: name.clone() });

    reporter.report(Progress::Stage(Stage::AddingHydrogens));
    let repaired = backend.repair(input, TARGET_PH)?;

    reporter.report(Progress::Stage(Stage::AddingSolvent));
    let mut system = backend.solvate_and_build(&repaired, &config.forcefield, SOLVENT_PADDING_NM)?;
    reporter.report(Progress::Stage(Stage::CreatingSystem));

    reporter.report(Progress::Stage(Stage::Minimizing));
    let (minimized, metadata) =
        backend.minimize(&mut system, config.platform, config.max_iterations)?;
    reporter.report(Progress::Message(format!(
        "Minimization of {} completed",
        name
    )));

    // Nothing is written until the full upstream computation succeeded.
    let stem = file_stem(input)?;
    let subdirectory = config.output_root.join(&stem);
    std::fs::create_dir_all(&subdirectory)?;

    let raw_path = subdirectory.join(format!("{}{}", stem, RAW_SUFFIX));
    PdbFile::write_to_path(&minimized, &metadata, &raw_path)
        .map_err(|e| EngineError::from_pdb(&raw_path, e))?;

    match strip_and_persist_clean(&raw_path, &subdirectory, &stem, reporter) {
        Ok(clean_path) => Ok((raw_path, clean_path)),
        Err(err) => {
            // A failed file must leave no partial artifacts behind.
            if let Err(remove_err) = std::fs::remove_file(&raw_path) {
                warn!(
                    path = %raw_path.display(),
                    error = %remove_err,
                    "Could not remove raw output after downstream failure."
                );
            }
            Err(err)
        }
    }
}

/// Re-reads the freshly written raw file, removes every heterogen (water is
/// always discarded), and writes the clean output next to it.
fn strip_and_persist_clean(
    raw_path: &Path,
    subdirectory: &Path,
    stem: &str,
    reporter: &ProgressReporter,
) -> Result<PathBuf, EngineError> {
    let (mut structure, metadata) =
        PdbFile::read_from_path(raw_path).map_err(|e| EngineError::from_pdb(raw_path, e))?;

    structure.strip_heterogens(false);
    reporter.report(Progress::Stage(Stage::RemovingHeterogens));

    let clean_path = subdirectory.join(format!("{}{}", stem, CLEAN_SUFFIX));
    PdbFile::write_to_path(&structure, &metadata, &clean_path)
        .map_err(|e| EngineError::from_pdb(&clean_path, e))?;
    Ok(clean_path)
}

/// Lists the `.pdb` files directly inside `dir`, sorted by name for a
/// deterministic batch order.
pub fn collect_structure_files(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_structure_file(path))
        .collect();
    files.sort();
    Ok(files)
}

/// True if the path carries the structure-file extension.
pub fn is_structure_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(STRUCTURE_EXTENSION))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_stem(path: &Path) -> Result<String, EngineError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("input path has no usable file name: {}", path.display()),
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pdb::PdbMetadata;
    use crate::core::models::{Atom, Residue, Structure};
    use crate::engine::config::{
        ForceField, ForceFieldSpec, JobConfigBuilder, Platform,
    };
    use nalgebra::Point3;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const VALID_PDB: &str = "\
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  C   ALA A   1      10.722   6.761  -4.144  1.00  0.00           C
ATOM      4  O   ALA A   1       9.581   7.089  -4.461  1.00  0.00           O
ATOM      5  N   GLY A   2      11.203   6.987  -2.920  1.00  0.00           N
ATOM      6  CA  GLY A   2      10.411   7.638  -1.879  1.00  0.00           C
END
";

    const SOLVENT_BOX: &str =
        "CRYST1   40.000   40.000   40.000  90.00  90.00  90.00 P 1           1";

    /// A deterministic stand-in for the external engine: repair parses the
    /// file, solvation appends water and an ion, minimization returns the
    /// coordinates unchanged.
    struct MockBackend {
        cuda_available: bool,
        diverge: bool,
        reject_forcefield: bool,
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self {
                cuda_available: true,
                diverge: false,
                reject_forcefield: false,
            }
        }
    }

    impl SimulationBackend for MockBackend {
        type System = Structure;

        fn repair(&self, input: &Path, _ph: f64) -> Result<Structure, EngineError> {
            let (structure, _) =
                PdbFile::read_from_path(input).map_err(|e| EngineError::from_pdb(input, e))?;
            Ok(structure)
        }

        fn solvate_and_build(
            &self,
            repaired: &Structure,
            _spec: &ForceFieldSpec,
            _padding_nm: f64,
        ) -> Result<Self::System, EngineError> {
            if self.reject_forcefield {
                return Err(EngineError::ForceFieldMismatch(
                    "no template for residue UNK".to_string(),
                ));
            }
            let mut solvated = repaired.clone();
            for i in 0..2 {
                let mut water = Residue::new("HOH", 'W', 500 + i);
                water
                    .atoms
                    .push(Atom::new("O", "O", Point3::new(20.0 + i as f64, 0.0, 0.0)));
                water
                    .atoms
                    .push(Atom::new("H1", "H", Point3::new(20.5 + i as f64, 0.5, 0.0)));
                water
                    .atoms
                    .push(Atom::new("H2", "H", Point3::new(20.5 + i as f64, -0.5, 0.0)));
                solvated.push_residue(water);
            }
            let mut ion = Residue::new("NA", 'W', 502);
            ion.atoms
                .push(Atom::new("NA", "NA", Point3::new(25.0, 0.0, 0.0)));
            solvated.push_residue(ion);
            Ok(solvated)
        }

        fn minimize(
            &self,
            system: &mut Self::System,
            platform: Platform,
            _max_iterations: u32,
        ) -> Result<(Structure, PdbMetadata), EngineError> {
            if platform == Platform::Cuda && !self.cuda_available {
                return Err(EngineError::PlatformUnavailable {
                    platform,
                    message: "no CUDA-capable device".to_string(),
                });
            }
            if self.diverge {
                return Err(EngineError::MinimizationDiverged(
                    "potential energy is not finite".to_string(),
                ));
            }
            Ok((
                system.clone(),
                PdbMetadata {
                    cryst1: Some(SOLVENT_BOX.to_string()),
                },
            ))
        }
    }

    fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn job_config(output_root: PathBuf, platform: Platform) -> JobConfig {
        JobConfigBuilder::new()
            .forcefield(ForceFieldSpec::with_default_water(ForceField::Amber14))
            .platform(platform)
            .max_iterations(50)
            .output_root(output_root)
            .build()
            .unwrap()
    }

    #[test]
    fn successful_input_produces_raw_and_clean_pair() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), "1ABC.pdb", VALID_PDB);
        let out = dir.path().join("out");
        let config = job_config(out.clone(), Platform::Cpu);

        let report = run(
            &MockBackend::default(),
            &config,
            &[input],
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(report.succeeded(), 1);
        let raw = out.join("1ABC").join("1ABC_minimized_raw.pdb");
        let clean = out.join("1ABC").join("1ABC_minimized_clean.pdb");
        assert!(raw.is_file());
        assert!(clean.is_file());

        let (raw_structure, _) = PdbFile::read_from_path(&raw).unwrap();
        let (clean_structure, _) = PdbFile::read_from_path(&clean).unwrap();
        assert!(raw_structure.contains_water());
        assert!(!clean_structure.contains_water());
        assert!(clean_structure.atom_count() < raw_structure.atom_count());
    }

    #[test]
    fn solvent_box_record_is_carried_into_both_outputs() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), "1ABC.pdb", VALID_PDB);
        let out = dir.path().join("out");
        let config = job_config(out.clone(), Platform::Cpu);

        run(
            &MockBackend::default(),
            &config,
            &[input],
            &ProgressReporter::new(),
        )
        .unwrap();

        for suffix in ["_minimized_raw.pdb", "_minimized_clean.pdb"] {
            let path = out.join("1ABC").join(format!("1ABC{}", suffix));
            let text = std::fs::read_to_string(&path).unwrap();
            assert_eq!(text.lines().next().unwrap(), SOLVENT_BOX);
        }
    }

    #[test]
    fn empty_input_set_is_a_precondition_failure() {
        let dir = TempDir::new().unwrap();
        let config = job_config(dir.path().join("out"), Platform::Cpu);

        let err = run(
            &MockBackend::default(),
            &config,
            &[],
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::EmptyInputSet));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn input_set_without_structure_files_is_a_precondition_failure() {
        let dir = TempDir::new().unwrap();
        let notes = write_input(dir.path(), "notes.txt", "not a structure");
        let config = job_config(dir.path().join("out"), Platform::Cpu);

        let err = run(
            &MockBackend::default(),
            &config,
            &[notes],
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::EmptyInputSet));
    }

    #[test]
    fn corrupted_file_fails_alone_and_batch_continues() {
        let dir = TempDir::new().unwrap();
        let good_a = write_input(dir.path(), "a.pdb", VALID_PDB);
        let bad = write_input(dir.path(), "b.pdb", "this is not a structure\n");
        let good_c = write_input(dir.path(), "c.pdb", VALID_PDB);
        let out = dir.path().join("out");
        let config = job_config(out.clone(), Platform::Cpu);

        let report = run(
            &MockBackend::default(),
            &config,
            &[good_a, bad, good_c],
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(report.reports[0].outcome.is_success());
        assert!(matches!(
            report.reports[1].outcome,
            FileOutcome::Failed(EngineError::StructureParse { .. })
        ));
        assert!(report.reports[2].outcome.is_success());

        assert!(out.join("a").join("a_minimized_raw.pdb").is_file());
        assert!(!out.join("b").exists());
        assert!(out.join("c").join("c_minimized_clean.pdb").is_file());
    }

    #[test]
    fn unavailable_platform_fails_every_file() {
        let dir = TempDir::new().unwrap();
        let a = write_input(dir.path(), "a.pdb", VALID_PDB);
        let b = write_input(dir.path(), "b.pdb", VALID_PDB);
        let out = dir.path().join("out");
        let config = job_config(out.clone(), Platform::Cuda);
        let backend = MockBackend {
            cuda_available: false,
            ..MockBackend::default()
        };

        let report = run(&backend, &config, &[a, b], &ProgressReporter::new()).unwrap();

        assert_eq!(report.failed(), 2);
        for file_report in &report.reports {
            assert!(matches!(
                file_report.outcome,
                FileOutcome::Failed(EngineError::PlatformUnavailable { .. })
            ));
        }
        assert!(!out.join("a").join("a_minimized_raw.pdb").exists());
        assert!(!out.join("b").join("b_minimized_raw.pdb").exists());
    }

    #[test]
    fn forcefield_mismatch_is_scoped_to_the_file() {
        let dir = TempDir::new().unwrap();
        let a = write_input(dir.path(), "a.pdb", VALID_PDB);
        let config = job_config(dir.path().join("out"), Platform::Cpu);
        let backend = MockBackend {
            reject_forcefield: true,
            ..MockBackend::default()
        };

        let report = run(&backend, &config, &[a], &ProgressReporter::new()).unwrap();
        assert!(matches!(
            report.reports[0].outcome,
            FileOutcome::Failed(EngineError::ForceFieldMismatch(_))
        ));
    }

    #[test]
    fn diverged_minimization_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let a = write_input(dir.path(), "a.pdb", VALID_PDB);
        let out = dir.path().join("out");
        let config = job_config(out.clone(), Platform::Cpu);
        let backend = MockBackend {
            diverge: true,
            ..MockBackend::default()
        };

        let report = run(&backend, &config, &[a], &ProgressReporter::new()).unwrap();
        assert!(matches!(
            report.reports[0].outcome,
            FileOutcome::Failed(EngineError::MinimizationDiverged(_))
        ));
        assert!(!out.join("a").exists() || !out.join("a").join("a_minimized_raw.pdb").exists());
    }

    #[test]
    fn wrong_extension_is_skipped_but_batch_continues() {
        let dir = TempDir::new().unwrap();
        let good = write_input(dir.path(), "a.pdb", VALID_PDB);
        let other = write_input(dir.path(), "b.cif", "irrelevant");
        let config = job_config(dir.path().join("out"), Platform::Cpu);

        let report = run(
            &MockBackend::default(),
            &config,
            &[other, good],
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(matches!(
            report.reports[0].outcome,
            FileOutcome::Skipped(SkipReason::InvalidExtension)
        ));
        assert!(report.reports[1].outcome.is_success());
    }

    #[test]
    fn failure_after_raw_write_removes_the_raw_file() {
        let dir = TempDir::new().unwrap();
        let a = write_input(dir.path(), "a.pdb", VALID_PDB);
        let out = dir.path().join("out");
        // Occupy the clean output path with a directory so the final write
        // fails after the raw file already exists.
        std::fs::create_dir_all(out.join("a").join("a_minimized_clean.pdb")).unwrap();
        let config = job_config(out.clone(), Platform::Cpu);

        let report = run(
            &MockBackend::default(),
            &config,
            &[a],
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(matches!(
            report.reports[0].outcome,
            FileOutcome::Failed(EngineError::Io(_))
        ));
        assert!(!out.join("a").join("a_minimized_raw.pdb").exists());
    }

    #[test]
    fn repeated_runs_produce_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), "1ABC.pdb", VALID_PDB);
        let out_a = dir.path().join("out_a");
        let out_b = dir.path().join("out_b");

        for out in [&out_a, &out_b] {
            let config = job_config(out.clone(), Platform::Cpu);
            run(
                &MockBackend::default(),
                &config,
                std::slice::from_ref(&input),
                &ProgressReporter::new(),
            )
            .unwrap();
        }

        for suffix in ["_minimized_raw.pdb", "_minimized_clean.pdb"] {
            let a = std::fs::read(out_a.join("1ABC").join(format!("1ABC{}", suffix))).unwrap();
            let b = std::fs::read(out_b.join("1ABC").join(format!("1ABC{}", suffix))).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn progress_events_follow_the_pipeline_order() {
        let dir = TempDir::new().unwrap();
        let input = write_input(dir.path(), "1ABC.pdb", VALID_PDB);
        let config = job_config(dir.path().join("out"), Platform::Cpu);

        let events: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            let label = match event {
                Progress::BatchStart { .. } => "batch-start".to_string(),
                Progress::FileStart { .. } => "file-start".to_string(),
                Progress::Stage(stage) => stage.message().to_string(),
                Progress::FileSucceeded { .. } => "file-succeeded".to_string(),
                Progress::FileFailed { .. } => "file-failed".to_string(),
                Progress::FileSkipped { .. } => "file-skipped".to_string(),
                Progress::Message(_) => "message".to_string(),
                Progress::BatchFinish => "batch-finish".to_string(),
            };
            events.lock().unwrap().push(label);
        }));

        run(&MockBackend::default(), &config, &[input], &reporter).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "batch-start",
                "file-start",
                "Adding Hydrogens",
                "Adding Solvent",
                "Creating a System",
                "Minimizing...",
                "message",
                "Heterogens Removed",
                "file-succeeded",
                "message",
                "batch-finish",
            ]
        );
    }

    #[test]
    fn collect_structure_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        write_input(dir.path(), "b.pdb", VALID_PDB);
        write_input(dir.path(), "a.pdb", VALID_PDB);
        write_input(dir.path(), "notes.txt", "x");
        std::fs::create_dir(dir.path().join("sub.pdb")).unwrap();

        let files = collect_structure_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdb", "b.pdb"]);
    }

    #[test]
    fn structure_extension_check_is_case_insensitive() {
        assert!(is_structure_file(Path::new("x.pdb")));
        assert!(is_structure_file(Path::new("x.PDB")));
        assert!(!is_structure_file(Path::new("x.cif")));
        assert!(!is_structure_file(Path::new("pdb")));
    }
}
