use std::sync::Mutex;

use ecosort_cli_core::{ProgressBar, ProgressManager, prefixes};
use ecosort_smoke::{StepObserver, StepResult};

/// Shows a spinner while a step is in flight, then a pass/fail line.
pub struct SpinnerObserver {
    progress: ProgressManager,
    current: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    pub fn new(progress: ProgressManager) -> Self {
        Self {
            progress,
            current: Mutex::new(None),
        }
    }
}

impl StepObserver for SpinnerObserver {
    fn started(
        &self,
        name: &str,
    ) {
        let spinner = self
            .progress
            .add_spinner(prefixes::CHECKING, name);
        if let Ok(mut current) = self.current.lock() {
            *current = Some(spinner);
        }
    }

    fn finished(
        &self,
        result: &StepResult,
    ) {
        if let Some(spinner) = self
            .current
            .lock()
            .ok()
            .and_then(|mut current| current.take())
        {
            spinner.finish_and_clear();
        }

        let line = match &result.failure {
            Some(failure) => format!("{}: {failure}", result.name),
            None => format!("{} ({} ms)", result.name, result.elapsed_ms),
        };
        self.progress
            .outcome(result.passed(), &line);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ecosort_smoke::{Prerequisite, StepResult};

    use super::*;

    #[test]
    fn spinner_is_cleared_after_each_step() {
        let observer = SpinnerObserver::new(ProgressManager::disabled());

        observer.started("health");
        assert!(observer.current.lock().unwrap().is_some());

        observer.finished(&StepResult::pass("health", "Server is running", None, Duration::from_millis(3)));
        assert!(observer.current.lock().unwrap().is_none());

        // skipped steps still report through the same path
        observer.started("profile");
        observer.finished(&StepResult::skipped("profile", Prerequisite::SessionToken));
        assert!(observer.current.lock().unwrap().is_none());
    }
}
