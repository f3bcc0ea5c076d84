//! Advisory progress channel from the workflow to a front end.
//!
//! Events carry no control information; dropping every one of them changes
//! nothing about the batch outcome.

/// The pipeline stages reported while one file is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AddingHydrogens,
    AddingSolvent,
    CreatingSystem,
    Minimizing,
    RemovingHeterogens,
}

impl Stage {
    /// The human-readable status text for this stage.
    pub fn message(&self) -> &'static str {
        match self {
            Stage::AddingHydrogens => "Adding Hydrogens",
            Stage::AddingSolvent => "Adding Solvent",
            Stage::CreatingSystem => "Creating a System",
            Stage::Minimizing => "Minimizing...",
            Stage::RemovingHeterogens => "Heterogens Removed",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Progress {
    /// The batch is starting; `total_files` inputs will be attempted.
    BatchStart { total_files: u64 },
    /// A file has been picked up ("Loading X").
    FileStart { name: String },
    /// A stage within the current file has been reached.
    Stage(Stage),
    /// The current file completed both outputs.
    FileSucceeded { name: String },
    /// The current file failed; the batch continues.
    FileFailed { name: String, message: String },
    /// The current file was skipped without processing.
    FileSkipped { name: String, reason: String },
    /// Free-form advisory text.
    Message(String),
    /// All inputs have been attempted.
    BatchFinish,
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Holds an optional callback and forwards events to it.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that discards every event.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
