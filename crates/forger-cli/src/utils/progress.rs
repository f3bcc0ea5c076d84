use indicatif::{ProgressBar, ProgressStyle};
use proteinforger::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Translates workflow progress events into a single progress bar: the bar
/// position counts finished files, the message shows the current stage.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::bar_style())
            .with_message("Waiting...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::BatchStart { total_files } => {
                    pb.reset();
                    pb.set_length(total_files);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message("Starting batch");
                }
                Progress::FileStart { name } => {
                    pb.set_message(format!("Loading {}", name));
                }
                Progress::Stage(stage) => {
                    pb.set_message(stage.message().to_string());
                }
                Progress::FileSucceeded { name } => {
                    pb.println(format!("  ✓ {}", name));
                    pb.inc(1);
                }
                Progress::FileFailed { name, message } => {
                    pb.println(format!("  ✗ {}: {}", name, message));
                    pb.inc(1);
                }
                Progress::FileSkipped { name, reason } => {
                    pb.println(format!("  - {} skipped ({})", name, reason));
                    pb.inc(1);
                }
                Progress::Message(msg) => {
                    pb.println(format!("  {}", msg));
                }
                Progress::BatchFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message("Done");
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("Failed to create progress style template")
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proteinforger::engine::progress::Stage;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_files_and_stages() {
        let handler = CliProgressHandler::new();
        let callback = handler.callback();

        callback(Progress::BatchStart { total_files: 2 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(2));
            assert_eq!(pb.position(), 0);
        }

        callback(Progress::FileStart {
            name: "1ABC.pdb".to_string(),
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Loading 1ABC.pdb");
        }

        callback(Progress::Stage(Stage::Minimizing));
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Minimizing...");
        }

        callback(Progress::FileSucceeded {
            name: "1ABC.pdb".to_string(),
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.position(), 1);
        }

        callback(Progress::BatchFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.message(), "Done");
        }
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.callback();

        std::thread::spawn(move || {
            callback(Progress::BatchStart { total_files: 1 });
            callback(Progress::FileFailed {
                name: "x.pdb".to_string(),
                message: "boom".to_string(),
            });
            callback(Progress::BatchFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 1);
    }
}
