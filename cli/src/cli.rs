use std::{path::PathBuf, process::ExitCode, time::Duration};

use ecosort_cli_core::{WithProgressConfig, prefixes};
use ecosort_smoke::{Overrides, Report, SmokeConfig, verify};

use crate::observer::SpinnerObserver;

#[derive(Default, clap::ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Debug,
    Trace,
    #[default]
    Info,
    Error,
    Warn,
}

impl From<LogLevel> for tracing::Level {
    fn from(val: LogLevel) -> Self {
        match val {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
        }
    }
}

#[derive(Default, clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    #[default]
    Console,
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct WithOutput {
    #[clap(
        long,
        value_enum,
        default_value = "console",
        env = "ECOSORT_FORMAT",
        help = "how the report is printed to stdout."
    )]
    pub format: Format,

    #[clap(
        long,
        default_value_t = false,
        env = "ECOSORT_FAIL_ON_ERROR",
        help = "exit with a non-zero code when any step failed."
    )]
    pub fail_on_error: bool,
}

impl WithOutput {
    /// Prints the report and maps it to the process exit code.
    pub fn emit(
        &self,
        report: &Report,
    ) -> ecosort_smoke::Result<ExitCode> {
        match self.format {
            Format::Console => println!("{report}"),
            Format::Json => println!("{}", report.to_json()?),
        }

        Ok(if self.should_fail(report) {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    /// A completed run exits 0 unless `--fail-on-error` asks otherwise.
    pub fn should_fail(
        &self,
        report: &Report,
    ) -> bool {
        self.fail_on_error && !report.is_success()
    }
}

/// Runs the API smoke checklist against a backend and prints a report.
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "ecosort-smoke", version)]
pub struct SmokeCli {
    #[clap(
        long,
        default_value = "error",
        env = "LOG_LEVEL",
        help = "the verbosity level to print logs at."
    )]
    pub log_level: LogLevel,

    #[clap(
        short = 'u',
        long,
        env = "ECOSORT_BASE_URL",
        help = "the base url of the backend. [default: http://localhost:5000]"
    )]
    pub base_url: Option<String>,

    #[clap(
        short = 't',
        long,
        value_name = "SECS",
        env = "ECOSORT_TIMEOUT_SECS",
        help = "per-request timeout in seconds. [default: 10]"
    )]
    pub timeout: Option<u64>,

    #[clap(
        short = 'd',
        long = "config-dir",
        env = "ECOSORT_CONFIG_DIR",
        help = "directory holding an optional ecosort.toml."
    )]
    pub config_dir: Option<PathBuf>,

    #[clap(flatten)]
    pub output: WithOutput,

    #[clap(flatten)]
    pub progress: WithProgressConfig,
}

impl SmokeCli {
    pub async fn run(self) -> ecosort_smoke::Result<ExitCode> {
        let config = SmokeConfig::load(
            self.config_dir.as_deref(),
            &Overrides {
                base_url: self.base_url,
                timeout_secs: self.timeout,
            },
        )?;

        let progress = self.progress.create_manager();
        let report = config
            .harness()?
            .with_observer(SpinnerObserver::new(progress.clone()))
            .run()
            .await;

        progress.complete(format!(
            "{} of {} steps passed",
            report.summary.passed, report.summary.total
        ));

        self.output.emit(&report)
    }
}

/// Checks the database connection string in `MONGODB_URI` and probes its hosts.
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "ecosort-verify", version)]
pub struct VerifyCli {
    #[clap(
        long,
        default_value = "error",
        env = "LOG_LEVEL",
        help = "the verbosity level to print logs at."
    )]
    pub log_level: LogLevel,

    #[clap(
        short = 't',
        long,
        value_name = "SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..=300),
        env = "ECOSORT_TIMEOUT_SECS",
        help = "connect timeout per host in seconds."
    )]
    pub timeout: u64,

    #[clap(flatten)]
    pub output: WithOutput,

    #[clap(flatten)]
    pub progress: WithProgressConfig,
}

impl VerifyCli {
    pub async fn run(self) -> ecosort_smoke::Result<ExitCode> {
        self.run_with(|key| std::env::var(key).ok())
            .await
    }

    /// Like [`VerifyCli::run`], reading the connection string through `lookup`.
    pub async fn run_with(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ecosort_smoke::Result<ExitCode> {
        // before any network activity
        let config = verify::DatabaseConfig::from_lookup(lookup)?;

        let progress = self.progress.create_manager();
        let spinner = progress.add_spinner(prefixes::VERIFYING, verify::DATABASE_URL_KEY);

        let report = verify::verify_connection(&config, Duration::from_secs(self.timeout)).await;
        spinner.finish_and_clear();
        let report = report?;

        for step in &report.steps {
            progress.outcome(step.passed(), &step.name);
        }
        progress.complete("connection check");

        self.output.emit(&report)
    }
}
