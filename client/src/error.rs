use serde::Serialize;
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum CallError {
    #[error("{status}: {error}")]
    Application {
        status: reqwest::StatusCode,
        error: ApiError,
    },
    #[error("transport error ({kind}): {source}")]
    Transport {
        kind: TransportKind,
        #[source]
        source: reqwest::Error,
    },
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Validation errors: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

impl From<reqwest::Error> for CallError {
    fn from(source: reqwest::Error) -> Self {
        Self::Transport {
            kind: TransportKind::of(&source),
            source,
        }
    }
}

impl CallError {
    /// The response status, when the backend answered at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no request left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Url(_) | Self::Serde(_) | Self::Validation(_) | Self::InvalidToken(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Timeout,
    Connect,
    Body,
    Other,
}

impl TransportKind {
    pub fn of(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_body() || err.is_decode() {
            Self::Body
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connection",
            Self::Body => "body",
            Self::Other => "request",
        };
        write!(f, "{s}")
    }
}

/// A single rejected field from a validation error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn from_item(item: &Value) -> Option<Self> {
        match item {
            Value::String(message) => {
                Some(Self {
                    field: String::new(),
                    message: message.clone(),
                })
            },
            Value::Object(map) => {
                let field = ["path", "param", "field", "key"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str))
                    .unwrap_or_default()
                    .to_string();
                let message = ["msg", "message"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string());
                Some(Self { field, message })
            },
            _ => None,
        }
    }
}

/// Parsed body of a non-2xx response.
///
/// The backend answers errors as `{message}` or `{error}`, optionally with an
/// `errors` list (`[{path, msg}]`) or map (`{field: message}`) describing
/// rejected fields. Anything else is kept verbatim in `body`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub message: Option<String>,
    pub field_errors: Vec<FieldError>,
    pub body: Value,
}

const CONFLICT_PHRASES: &[&str] = &["already exists", "already registered", "already taken"];

impl ApiError {
    pub fn from_body(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self {
                message: Some("empty response body".to_string()),
                field_errors: vec![],
                body: Value::Null,
            };
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(parse_err) => {
                tracing::trace! {
                    "Failed to parse error response: {}",
                    parse_err,
                }
                let error_str = String::from_utf8_lossy(body).to_string();
                Self {
                    message: Some(error_str.clone()),
                    field_errors: vec![],
                    body: Value::String(error_str),
                }
            },
        }
    }

    pub fn from_value(value: Value) -> Self {
        let message = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let field_errors = match value.get("errors") {
            Some(Value::Array(items)) => items.iter().filter_map(FieldError::from_item).collect(),
            Some(Value::Object(map)) => {
                map.iter()
                    .map(|(field, detail)| {
                        FieldError {
                            field: field.clone(),
                            message: detail
                                .as_str()
                                .or_else(|| detail.get("message").and_then(Value::as_str))
                                .map(str::to_string)
                                .unwrap_or_else(|| detail.to_string()),
                        }
                    })
                    .collect()
            },
            _ => vec![],
        };

        Self {
            message,
            field_errors,
            body: value,
        }
    }

    pub fn is_validation(&self) -> bool {
        !self.field_errors.is_empty()
    }

    /// Whether this error reports that the resource already exists.
    ///
    /// A 409 always counts. A 400 counts only when its message says so,
    /// since the backend also uses 400 for plain validation failures.
    pub fn is_conflict(
        &self,
        status: reqwest::StatusCode,
    ) -> bool {
        if status == reqwest::StatusCode::CONFLICT {
            return true;
        }

        status == reqwest::StatusCode::BAD_REQUEST
            && self
                .message
                .as_deref()
                .map(mentions_existing)
                .unwrap_or(false)
    }
}

fn mentions_existing(message: &str) -> bool {
    let lower = message.to_lowercase();
    CONFLICT_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

impl std::fmt::Display for ApiError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{message}")?,
            None => write!(f, "{}", self.body)?,
        }

        if !self.field_errors.is_empty() {
            let fields: Vec<String> = self
                .field_errors
                .iter()
                .map(|e| {
                    if e.field.is_empty() {
                        e.message.clone()
                    } else {
                        format!("{}: {}", e.field, e.message)
                    }
                })
                .collect();
            write!(f, " ({})", fields.join("; "))?;
        }

        Ok(())
    }
}
