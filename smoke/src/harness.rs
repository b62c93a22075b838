use std::time::Instant;

use chrono::{DateTime, Utc};
use ecosort_client::{CallError, Reply, paths};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    context::RunContext,
    expect::Expect,
    report::Report,
    step::{Failure, Outcome, Prerequisite, StepResult},
};

pub mod steps {
    pub const HEALTH: &str = "health";
    pub const REGISTER: &str = "register";
    pub const LOGIN: &str = "login";
    pub const PROFILE: &str = "profile";
    pub const DASHBOARD: &str = "dashboard";
    pub const CLASSIFICATION: &str = "classification";
    pub const ARTICLES: &str = "articles";
    pub const COMMUNITY_POSTS: &str = "community posts";
    pub const MAP_LOCATIONS: &str = "map locations";
}

/// Hooks for live progress while a run is in flight.
pub trait StepObserver {
    fn started(
        &self,
        _name: &str,
    ) {
    }

    fn finished(
        &self,
        _result: &StepResult,
    ) {
    }
}

impl StepObserver for () {}

/// How the registration step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    /// The account exists already; the run continues with login.
    AlreadyExists,
    Failed,
}

/// An unauthenticated list endpoint and where its items live in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicResource {
    pub name: &'static str,
    pub path: &'static str,
    pub items: &'static str,
}

impl PublicResource {
    pub const ARTICLES: Self = Self {
        name: steps::ARTICLES,
        path: paths::ARTICLES,
        items: "/data/articles",
    };
    pub const COMMUNITY_POSTS: Self = Self {
        name: steps::COMMUNITY_POSTS,
        path: paths::COMMUNITY_POSTS,
        items: "/data/posts",
    };
    pub const MAP_LOCATIONS: Self = Self {
        name: steps::MAP_LOCATIONS,
        path: paths::MAP_LOCATIONS,
        items: "/data",
    };

    pub const ALL: [Self; 3] = [Self::ARTICLES, Self::COMMUNITY_POSTS, Self::MAP_LOCATIONS];
}

/// Drives the fixed checklist against one backend.
///
/// Steps run one at a time, in declaration order. No step failure escapes:
/// each one lands in the run context as a [`StepResult`], and steps whose
/// prerequisite is missing are recorded as skipped without touching the
/// network.
pub struct Harness {
    ctx: RunContext,
    register: bool,
    observer: Box<dyn StepObserver + Send>,
    started_at: DateTime<Utc>,
}

impl Harness {
    pub fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            register: true,
            observer: Box::new(()),
            started_at: Utc::now(),
        }
    }

    /// With registration disabled the run goes straight to login.
    pub fn with_registration(
        mut self,
        enabled: bool,
    ) -> Self {
        self.register = enabled;
        self
    }

    pub fn with_observer(
        mut self,
        observer: impl StepObserver + Send + 'static,
    ) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub async fn run(mut self) -> Report {
        info!(base_url = %self.ctx.client().base_url(), "starting smoke run");

        self.run_health_check().await;

        if self.register {
            let registration = self.register_user().await;
            debug!(?registration, "registration finished, logging in");
        }

        self.login().await;
        self.get_profile().await;
        self.get_dashboard().await;
        self.submit_classification().await;

        for resource in PublicResource::ALL {
            self.list_public_resource(resource)
                .await;
        }

        self.finish()
    }

    /// Ends the run with whatever has been recorded so far.
    pub fn finish(self) -> Report {
        let target = self
            .ctx
            .client()
            .base_url()
            .to_string();
        Report::new(target, self.started_at, self.ctx.into_results())
    }

    fn begin(
        &self,
        name: &str,
    ) -> Instant {
        debug!(step = name, "starting step");
        self.observer.started(name);
        Instant::now()
    }

    fn record(
        &mut self,
        result: StepResult,
    ) -> Outcome {
        match &result.failure {
            None => info!(step = %result.name, note = ?result.note, "passed"),
            Some(failure) => warn!(step = %result.name, %failure, "failed"),
        }

        self.observer.finished(&result);
        self.ctx.record(result).outcome
    }

    fn skip(
        &mut self,
        name: &str,
        prerequisite: Prerequisite,
    ) -> Outcome {
        self.observer.started(name);
        self.record(StepResult::skipped(name, prerequisite))
    }

    fn judge(
        name: &str,
        started: Instant,
        result: Result<Reply, CallError>,
        expect: Expect,
    ) -> StepResult {
        let elapsed = started.elapsed();

        match result {
            Ok(reply) => {
                match expect.check(&reply.body) {
                    Ok(note) => StepResult::pass(name, note, Some(reply.body), elapsed),
                    Err(failure) => StepResult::fail(name, failure, elapsed),
                }
            },
            Err(err) => StepResult::fail(name, err.into(), elapsed),
        }
    }

    pub async fn run_health_check(&mut self) -> Outcome {
        let started = self.begin(steps::HEALTH);
        let result = self.ctx.client.health().await;
        self.record(Self::judge(steps::HEALTH, started, result, Expect::Message))
    }

    pub async fn register_user(&mut self) -> Registration {
        let started = self.begin(steps::REGISTER);
        let result = self
            .ctx
            .client
            .register(&self.ctx.credentials)
            .await;
        let elapsed = started.elapsed();

        let (step, registration) = match result {
            Ok(reply) => {
                let note = reply
                    .message()
                    .unwrap_or("registered")
                    .to_string();
                (
                    StepResult::pass(steps::REGISTER, note, Some(reply.body), elapsed),
                    Registration::Created,
                )
            },
            Err(CallError::Application { status, error }) if error.is_conflict(status) => {
                info!(email = %self.ctx.credentials.email, "account already exists, continuing with login");
                (
                    StepResult::pass(
                        steps::REGISTER,
                        format!("account already exists ({}), continuing with login", status.as_u16()),
                        Some(error.body),
                        elapsed,
                    ),
                    Registration::AlreadyExists,
                )
            },
            Err(err) => {
                (
                    StepResult::fail(steps::REGISTER, err.into(), elapsed),
                    Registration::Failed,
                )
            },
        };

        self.record(step);
        registration
    }

    pub async fn login(&mut self) -> Outcome {
        let started = self.begin(steps::LOGIN);
        let result = self
            .ctx
            .client
            .login(&self.ctx.credentials)
            .await;
        let elapsed = started.elapsed();

        let step = match result {
            Ok(reply) => {
                match reply.token() {
                    Some(token) => {
                        if !self.ctx.establish_session(token) {
                            warn!("session token already established, keeping the first one");
                        }
                        StepResult::pass(
                            steps::LOGIN,
                            "session token acquired",
                            Some(redact_token(reply.body)),
                            elapsed,
                        )
                    },
                    None => {
                        StepResult::fail(
                            steps::LOGIN,
                            Failure::Shape {
                                expected: "a token at /token or /data/token".into(),
                                body: redact_token(reply.body),
                            },
                            elapsed,
                        )
                    },
                }
            },
            Err(err) => StepResult::fail(steps::LOGIN, err.into(), elapsed),
        };

        self.record(step)
    }

    pub async fn get_profile(&mut self) -> Outcome {
        let Some(token) = self.ctx.session().cloned() else {
            return self.skip(steps::PROFILE, Prerequisite::SessionToken);
        };

        let started = self.begin(steps::PROFILE);
        let result = self.ctx.client.profile(&token).await;
        self.record(Self::judge(
            steps::PROFILE,
            started,
            result,
            Expect::Field("/data/fullName"),
        ))
    }

    pub async fn get_dashboard(&mut self) -> Outcome {
        let Some(token) = self.ctx.session().cloned() else {
            return self.skip(steps::DASHBOARD, Prerequisite::SessionToken);
        };

        let started = self.begin(steps::DASHBOARD);
        let result = self
            .ctx
            .client
            .dashboard(&token)
            .await;
        self.record(Self::judge(
            steps::DASHBOARD,
            started,
            result,
            Expect::Field("/data/stats"),
        ))
    }

    pub async fn submit_classification(&mut self) -> Outcome {
        let Some(token) = self.ctx.session().cloned() else {
            return self.skip(steps::CLASSIFICATION, Prerequisite::SessionToken);
        };

        let started = self.begin(steps::CLASSIFICATION);
        let result = self
            .ctx
            .client
            .submit_classification(&token, &self.ctx.submission)
            .await;
        self.record(Self::judge(
            steps::CLASSIFICATION,
            started,
            result,
            Expect::Any,
        ))
    }

    pub async fn list_public_resource(
        &mut self,
        resource: PublicResource,
    ) -> Outcome {
        let started = self.begin(resource.name);
        let result = self.ctx.client.list(resource.path).await;
        self.record(Self::judge(
            resource.name,
            started,
            result,
            Expect::Array(resource.items),
        ))
    }
}

fn redact_token(mut body: Value) -> Value {
    for pointer in ["/token", "/data/token"] {
        if let Some(value) = body.pointer_mut(pointer) {
            *value = Value::String("[redacted]".into());
        }
    }
    body
}
