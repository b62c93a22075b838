use std::sync::OnceLock;

use ecosort_client::{ApiClient, ClassificationSubmission, Credentials, SessionToken};

use crate::step::StepResult;

/// State threaded through every step of one run.
///
/// The session token is written at most once, by login, and only read
/// afterwards. Results are append-only.
pub struct RunContext {
    pub(crate) client: ApiClient,
    pub(crate) credentials: Credentials,
    pub(crate) submission: ClassificationSubmission,
    session: OnceLock<SessionToken>,
    results: Vec<StepResult>,
}

impl RunContext {
    pub fn new(
        client: ApiClient,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            credentials,
            submission: ClassificationSubmission::fixture(),
            session: OnceLock::new(),
            results: vec![],
        }
    }

    pub fn with_submission(
        mut self,
        submission: ClassificationSubmission,
    ) -> Self {
        self.submission = submission;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> Option<&SessionToken> {
        self.session.get()
    }

    /// Stores the token; returns false if one was already set.
    pub(crate) fn establish_session(
        &self,
        token: SessionToken,
    ) -> bool {
        self.session.set(token).is_ok()
    }

    pub(crate) fn record(
        &mut self,
        result: StepResult,
    ) -> &StepResult {
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub(crate) fn into_results(self) -> Vec<StepResult> {
        self.results
    }
}
