use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::step::{Failure, Outcome, StepResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn of(steps: &[StepResult]) -> Self {
        let passed = steps
            .iter()
            .filter(|s| s.outcome == Outcome::Pass)
            .count();

        Self {
            total: steps.len(),
            passed,
            failed: steps.len() - passed,
        }
    }
}

/// Outcome of one run, in step order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: Summary,
    pub steps: Vec<StepResult>,
}

impl Report {
    pub fn new(
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        steps: Vec<StepResult>,
    ) -> Self {
        Self {
            target: target.into(),
            started_at,
            finished_at: Utc::now(),
            summary: Summary::of(&steps),
            steps,
        }
    }

    pub fn step(
        &self,
        name: &str,
    ) -> Option<&StepResult> {
        self.steps
            .iter()
            .find(|s| s.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        self.steps
            .iter()
            .filter(|s| s.outcome == Outcome::Fail)
    }

    pub fn is_success(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn marker(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "✅",
        Outcome::Fail => "❌",
    }
}

impl std::fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "Smoke run against {}", self.target)?;
        writeln!(f)?;

        for step in &self.steps {
            let detail = match (&step.failure, &step.note) {
                (Some(failure), _) => failure.to_string(),
                (None, Some(note)) => note.clone(),
                (None, None) => String::new(),
            };

            write!(f, "{} {}: {detail}", marker(step.outcome), step.name)?;
            if !matches!(step.failure, Some(Failure::Skipped { .. })) {
                write!(f, " ({} ms)", step.elapsed_ms)?;
            }
            writeln!(f)?;
        }

        let mut failures = self.failures().peekable();
        if failures.peek().is_some() {
            writeln!(f)?;
            writeln!(f, "Failures:")?;
        }

        for step in failures {
            let Some(failure) = &step.failure else {
                continue;
            };

            writeln!(f, "{} {}", marker(step.outcome), step.name)?;
            match failure {
                Failure::Transport { cause, chain, .. } => {
                    writeln!(f, "   error: {cause}")?;
                    for cause in chain {
                        writeln!(f, "   caused by: {cause}")?;
                    }
                },
                Failure::Application { status, body, .. } => {
                    writeln!(f, "   status: {status}")?;
                    writeln!(f, "   detail: {body}")?;
                },
                Failure::Shape { expected, body } => {
                    writeln!(f, "   expected: {expected}")?;
                    writeln!(f, "   detail: {body}")?;
                },
                Failure::Skipped { .. } | Failure::Request { .. } => {
                    writeln!(f, "   reason: {failure}")?;
                },
            }
        }

        writeln!(f)?;
        write!(
            f,
            "Summary: {} steps, {} passed, {} failed",
            self.summary.total, self.summary.passed, self.summary.failed
        )
    }
}
