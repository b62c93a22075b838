use std::time::Duration;

use ecosort_client::{ApiError, CallError, FieldError, TransportKind};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
}

/// Something a step needs from an earlier step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prerequisite {
    SessionToken,
}

impl std::fmt::Display for Prerequisite {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::SessionToken => write!(f, "session token"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Conflict,
    Validation { fields: Vec<FieldError> },
    Client,
    Server,
}

impl ErrorClass {
    pub fn of(
        status: u16,
        error: &ApiError,
    ) -> Self {
        if status >= 500 {
            Self::Server
        } else if error.is_validation() {
            Self::Validation {
                fields: error.field_errors.clone(),
            }
        } else if status == 409 {
            Self::Conflict
        } else {
            Self::Client
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Conflict => write!(f, "conflict"),
            Self::Validation { .. } => write!(f, "validation rejected"),
            Self::Client => write!(f, "client error"),
            Self::Server => write!(f, "server error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Failure {
    /// The request never produced a response.
    Transport {
        transport: TransportKind,
        cause: String,
        /// `source()` chain of the underlying error, outermost first.
        chain: Vec<String>,
    },
    /// The backend answered non-2xx.
    Application {
        status: u16,
        class: ErrorClass,
        message: Option<String>,
        body: Value,
    },
    /// The backend answered 2xx but the payload broke its contract.
    Shape { expected: String, body: Value },
    /// A prerequisite was never produced; no request was made.
    Skipped { prerequisite: Prerequisite },
    /// The request could not be built.
    Request { cause: String },
}

impl Failure {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Structured response detail, when a response exists.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Application { body, .. } | Self::Shape { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<CallError> for Failure {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Application { status, error } => {
                Self::Application {
                    status: status.as_u16(),
                    class: ErrorClass::of(status.as_u16(), &error),
                    message: error.message,
                    body: error.body,
                }
            },
            CallError::Transport { kind, ref source } => {
                let mut chain = vec![];
                let mut next = std::error::Error::source(source);
                while let Some(cause) = next {
                    chain.push(cause.to_string());
                    next = cause.source();
                }

                Self::Transport {
                    transport: kind,
                    cause: err.to_string(),
                    chain,
                }
            },
            other => {
                Self::Request {
                    cause: other.to_string(),
                }
            },
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Transport { cause, .. } => write!(f, "{cause}"),
            Self::Application {
                status,
                class,
                message,
                ..
            } => {
                write!(f, "{status} {class}")?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                if let Self::Application {
                    class: ErrorClass::Validation { fields },
                    ..
                } = self
                {
                    let fields: Vec<&str> = fields
                        .iter()
                        .map(|e| e.field.as_str())
                        .filter(|name| !name.is_empty())
                        .collect();
                    if !fields.is_empty() {
                        write!(f, " [{}]", fields.join(", "))?;
                    }
                }
                Ok(())
            },
            Self::Shape { expected, .. } => write!(f, "unexpected payload shape: expected {expected}"),
            Self::Skipped { prerequisite } => write!(f, "skipped: missing prerequisite {prerequisite}"),
            Self::Request { cause } => write!(f, "request not sent: {cause}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub name: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    pub elapsed_ms: u64,
}

impl StepResult {
    pub fn pass(
        name: impl Into<String>,
        note: impl Into<String>,
        payload: Option<Value>,
        elapsed: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Pass,
            note: Some(note.into()),
            payload,
            failure: None,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn fail(
        name: impl Into<String>,
        failure: Failure,
        elapsed: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Fail,
            note: None,
            payload: None,
            failure: Some(failure),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn skipped(
        name: impl Into<String>,
        prerequisite: Prerequisite,
    ) -> Self {
        Self::fail(name, Failure::Skipped { prerequisite }, Duration::ZERO)
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}
