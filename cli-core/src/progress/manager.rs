use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use console::Style;
use indicatif::{MultiProgress, ProgressBar};

use super::style::{colors, prefixes, templates};

/// Spinners and status lines on stderr.
///
/// Everything here is a no-op when progress is disabled, so callers never
/// have to branch on it. Stdout is left to the report.
#[derive(Clone)]
pub struct ProgressManager {
    inner: Arc<ProgressManagerInner>,
}

struct ProgressManagerInner {
    multi: MultiProgress,
    start_time: Instant,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            inner: Arc::new(ProgressManagerInner {
                multi: MultiProgress::new(),
                start_time: Instant::now(),
                enabled,
            }),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Add a spinner (indeterminate progress)
    pub fn add_spinner(
        &self,
        prefix: &str,
        message: impl Into<String>,
    ) -> ProgressBar {
        if !self.inner.enabled {
            return ProgressBar::hidden();
        }

        let spinner = self
            .inner
            .multi
            .add(ProgressBar::new_spinner());
        spinner.set_style(templates::spinner());
        spinner.set_prefix(prefix.to_string());
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    pub fn println(
        &self,
        prefix: &str,
        message: &str,
    ) {
        self.println_styled(colors::prefix(), prefix, message);
    }

    pub fn println_styled(
        &self,
        style: Style,
        prefix: &str,
        message: &str,
    ) {
        if !self.inner.enabled {
            return;
        }

        let line = format!("{:>12} {}", style.apply_to(prefix), message);
        if self.inner.multi.println(&line).is_err() {
            eprintln!("{line}");
        }
    }

    /// One line per finished check, green or red.
    pub fn outcome(
        &self,
        passed: bool,
        message: &str,
    ) {
        if passed {
            self.println_styled(colors::success(), prefixes::PASSED, message);
        } else {
            self.println_styled(colors::error(), prefixes::FAILED, message);
        }
    }

    pub fn complete(
        &self,
        message: impl AsRef<str>,
    ) {
        let secs = self.elapsed().as_secs_f64();
        self.println(
            prefixes::FINISHED,
            &format!("{} in {:.3} seconds", message.as_ref(), secs),
        );
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_manager_hands_out_hidden_spinners() {
        let progress = ProgressManager::disabled();

        let spinner = progress.add_spinner(prefixes::CHECKING, "health");
        assert!(spinner.is_hidden());

        // no output, no panic
        progress.outcome(true, "health");
        progress.complete("smoke run");
    }
}
