use super::error::EngineError;
use std::path::PathBuf;

/// Why an input was skipped without any processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path does not carry a structure-file extension.
    InvalidExtension,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::InvalidExtension => "not a .pdb structure file",
        }
    }
}

/// The terminal state of one input file.
///
/// A failed or skipped input never owns output files; a succeeded input
/// owns exactly the raw/clean pair.
#[derive(Debug)]
pub enum FileOutcome {
    Succeeded { raw: PathBuf, clean: PathBuf },
    Skipped(SkipReason),
    Failed(EngineError),
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Succeeded { .. })
    }
}

/// One input path paired with its terminal state.
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: FileOutcome,
}

/// Everything that happened during one batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub reports: Vec<FileReport>,
}

impl BatchReport {
    pub fn push(&mut self, input: PathBuf, outcome: FileOutcome) {
        self.reports.push(FileReport { input, outcome });
    }

    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Skipped(_)))
            .count()
    }

    /// One-line summary for logs and the final user message.
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} skipped of {} file(s)",
            self.succeeded(),
            self.failed(),
            self.skipped(),
            self.reports.len()
        )
    }
}
