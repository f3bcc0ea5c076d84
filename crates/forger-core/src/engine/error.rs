use super::config::Platform;
use crate::core::io::pdb::PdbError;
use std::path::PathBuf;
use thiserror::Error;

/// The normalized error taxonomy of the pipeline.
///
/// Backend libraries fail in their own vocabularies; every adapter maps
/// those failures into one of these variants at its boundary so the
/// orchestrator never sees a raw library error. `EmptyInputSet` is the only
/// variant that aborts a batch; all others are scoped to a single input
/// file.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no structure files found in the input set")]
    EmptyInputSet,

    #[error("failed to parse structure file '{path}': {message}", path = path.display())]
    StructureParse { path: PathBuf, message: String },

    #[error("atom completion failed for '{path}': {message}", path = path.display())]
    Repair { path: PathBuf, message: String },

    #[error("force field cannot parameterize the structure: {0}")]
    ForceFieldMismatch(String),

    #[error("compute platform '{platform}' is unavailable: {message}")]
    PlatformUnavailable { platform: Platform, message: String },

    #[error("energy minimization diverged: {0}")]
    MinimizationDiverged(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("simulation backend failed: {0}")]
    Backend(String),
}

impl EngineError {
    /// Wraps a PDB parse failure for the given input path. I/O failures
    /// inside the parser stay I/O errors; only format problems become
    /// structure-parse errors.
    pub fn from_pdb(path: &std::path::Path, err: PdbError) -> Self {
        match err {
            PdbError::Io(io) => EngineError::Io(io),
            other => EngineError::StructureParse {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        }
    }
}
