use crate::progress::ProgressManager;

/// Shared progress configuration for CLI commands.
/// Use with `#[clap(flatten)]` in command arg structs.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WithProgressConfig {
    #[clap(
        long,
        default_value_t = false,
        env = "ECOSORT_NO_PROGRESS",
        help = "disable spinners and per-step status lines (useful for CI/scripts)"
    )]
    pub no_progress: bool,
}

impl WithProgressConfig {
    pub fn progress_enabled(&self) -> bool {
        !self.no_progress
    }

    pub fn create_manager(&self) -> ProgressManager {
        ProgressManager::new(self.progress_enabled())
    }
}
