use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, Environment, File};
use ecosort_client::{ApiClient, Credentials};
use secrecy::SecretString;
use serde::Deserialize;
use validator::Validate;

use crate::{Result, context::RunContext, harness::Harness};

/// Looked up as `ecosort.{toml,yaml,json}` in the config directory.
pub const FILE_NAME: &str = "ecosort";
pub const ENV_PREFIX: &str = "ECOSORT";

fn default_base_url() -> String {
    ecosort_client::DEFAULT_BASE_URL.into()
}

fn default_timeout_secs() -> u64 {
    ecosort_client::DEFAULT_TIMEOUT.as_secs()
}

fn default_username() -> String {
    "smoketest".into()
}

fn default_email() -> String {
    "smoketest@example.com".into()
}

fn default_password() -> SecretString {
    SecretString::from("smoketest123".to_string())
}

fn default_full_name() -> Option<String> {
    Some("Smoke Test".into())
}

fn default_register() -> bool {
    true
}

#[derive(Deserialize, Debug, Validate)]
pub struct SmokeConfig {
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_email")]
    pub email: String,

    #[serde(default = "default_password")]
    pub password: SecretString,

    #[serde(default = "default_full_name")]
    pub full_name: Option<String>,

    /// Register before logging in. Turn off to run against an existing account.
    #[serde(default = "default_register")]
    pub register: bool,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SmokeConfig {
    pub fn load(
        dir: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self> {
        Self::load_from(dir, Environment::with_prefix(ENV_PREFIX), overrides)
    }

    pub fn load_from(
        dir: Option<&Path>,
        env: Environment,
        overrides: &Overrides,
    ) -> Result<Self> {
        let file_name = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("./"))
            .join(FILE_NAME);

        let this: Self = Config::builder()
            .add_source(File::with_name(&file_name.display().to_string()).required(false))
            .add_source(env)
            .set_override_option("base_url", overrides.base_url.clone())?
            .set_override_option("timeout_secs", overrides.timeout_secs)?
            .build()?
            .try_deserialize()?;

        this.validate()?;
        this.credentials().validate()?;

        tracing::debug!(base_url = %this.base_url, timeout_secs = this.timeout_secs, "loaded smoke config");

        Ok(this)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: self.full_name.clone(),
        }
    }

    pub fn harness(&self) -> Result<Harness> {
        let client = ApiClient::new(&self.base_url, self.timeout())?;
        let ctx = RunContext::new(client, self.credentials());
        Ok(Harness::new(ctx).with_registration(self.register))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn env(vars: &[(&str, &str)]) -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    fn empty_dir() -> PathBuf {
        PathBuf::from("/nonexistent/ecosort-config")
    }

    #[test]
    fn defaults() {
        let config = SmokeConfig::load_from(Some(&empty_dir()), env(&[]), &Overrides::default()).unwrap();

        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.register);
        assert_eq!(config.credentials().email, "smoketest@example.com");
    }

    #[test]
    fn environment_and_overrides() {
        let config = SmokeConfig::load_from(
            Some(&empty_dir()),
            env(&[
                ("ECOSORT_BASE_URL", "http://backend:8080"),
                ("ECOSORT_TIMEOUT_SECS", "3"),
                ("ECOSORT_EMAIL", "qa@example.com"),
                ("ECOSORT_REGISTER", "false"),
            ]),
            &Overrides {
                base_url: None,
                timeout_secs: Some(20),
            },
        )
        .unwrap();

        assert_eq!(config.base_url, "http://backend:8080");
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.email, "qa@example.com");
        assert!(!config.register);
    }

    #[test]
    fn rejects_bad_values() {
        let err = SmokeConfig::load_from(
            Some(&empty_dir()),
            env(&[("ECOSORT_EMAIL", "not-an-email")]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = SmokeConfig::load_from(
            Some(&empty_dir()),
            env(&[]),
            &Overrides {
                base_url: Some("nowhere".into()),
                timeout_secs: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
