use miette::Diagnostic;

/// Pre-flight failures. Anything that happens once requests are in flight is
/// recorded in the report instead.
#[derive(thiserror::Error, Diagnostic, Debug)]
pub enum Error {
    #[error("missing required configuration value `{key}`")]
    #[diagnostic(
        code(ecosort::config::missing),
        help("export the variable named above and run again")
    )]
    MissingConfig { key: &'static str },

    #[error("invalid configuration value `{key}`: {reason}")]
    #[diagnostic(code(ecosort::config::invalid))]
    InvalidConfig { key: &'static str, reason: String },

    #[error("config error: {0}")]
    #[diagnostic(code(ecosort::config::load))]
    Config(#[from] ::config::ConfigError),

    #[error("validation errors: {0}")]
    #[diagnostic(code(ecosort::config::validation))]
    Validation(#[from] ::validator::ValidationErrors),

    #[error("{0}")]
    #[diagnostic(code(ecosort::client))]
    Client(#[from] ecosort_client::CallError),

    #[error("failed to serialise report: {0}")]
    #[diagnostic(code(ecosort::report))]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
