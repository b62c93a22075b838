//! API smoke-test harness for the ecosort backend.
//!
//! A run walks a fixed checklist of HTTP calls (health, registration, login,
//! the authenticated user endpoints, a classification submission, and the
//! public list endpoints), carrying the session token from login into every
//! later call. Every step lands in a [`Report`], which renders as a console
//! summary or serialises to JSON.
//!
//! ```no_run
//! # async fn run() -> ecosort_smoke::Result<()> {
//! use ecosort_smoke::{Overrides, SmokeConfig};
//!
//! let config = SmokeConfig::load(None, &Overrides::default())?;
//! let report = config.harness()?.run().await;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod config;
mod context;
mod error;
pub mod expect;
pub mod harness;
pub mod report;
pub mod step;
pub mod verify;

pub use crate::config::{Overrides, SmokeConfig};
pub use context::RunContext;
pub use error::{Error, Result};
pub use harness::{Harness, PublicResource, Registration, StepObserver, steps};
pub use report::{Report, Summary};
pub use step::{ErrorClass, Failure, Outcome, Prerequisite, StepResult};
