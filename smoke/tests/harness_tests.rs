//! End-to-end harness runs against a mock backend
//!
//! Covers step ordering, the registration conflict branch, skipping of
//! authenticated steps without a session, classification outcomes and
//! transport failures.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use ecosort_client::{ApiClient, ClassificationSubmission, Credentials, DEFAULT_TIMEOUT, paths};
use ecosort_smoke::{
    ErrorClass, Failure, Harness, Outcome, Prerequisite, PublicResource, Registration, RunContext,
    StepObserver, StepResult, steps,
};
use ecosort_testing::{MockBackend, UNREACHABLE_URL, backend::TOKEN};

fn credentials() -> Credentials {
    Credentials::new("tester", "tester@example.com", "secret123").with_full_name("Test User")
}

fn harness(base_url: &str) -> Harness {
    let client = ApiClient::new(base_url, DEFAULT_TIMEOUT).unwrap();
    Harness::new(RunContext::new(client, credentials()))
}

const AUTHENTICATED: [&str; 3] = [steps::PROFILE, steps::DASHBOARD, steps::CLASSIFICATION];

#[tokio::test]
async fn happy_path_passes_every_step_in_order() {
    ecosort_testing::logging();
    let backend = MockBackend::happy().await;

    let report = harness(&backend.uri()).run().await;

    let names: Vec<&str> = report
        .steps
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(
        names,
        [
            steps::HEALTH,
            steps::REGISTER,
            steps::LOGIN,
            steps::PROFILE,
            steps::DASHBOARD,
            steps::CLASSIFICATION,
            steps::ARTICLES,
            steps::COMMUNITY_POSTS,
            steps::MAP_LOCATIONS,
        ]
    );
    assert!(report.is_success(), "{report}");
    assert_eq!(report.summary.total, 9);

    assert_eq!(
        backend.paths().await,
        [
            paths::HEALTH,
            paths::REGISTER,
            paths::LOGIN,
            paths::PROFILE,
            paths::DASHBOARD,
            paths::CLASSIFICATION,
            paths::ARTICLES,
            paths::COMMUNITY_POSTS,
            paths::MAP_LOCATIONS,
        ]
    );

    assert_eq!(
        report.step(steps::ARTICLES).unwrap().note.as_deref(),
        Some("2 items")
    );
    assert_eq!(
        report.step(steps::MAP_LOCATIONS).unwrap().note.as_deref(),
        Some("3 items")
    );
}

#[tokio::test]
async fn registration_conflict_continues_with_login() {
    let backend = MockBackend::start().await;
    backend.healthy().await;
    backend.register_conflict().await;
    backend.logs_in(TOKEN).await;
    backend.profile(TOKEN).await;

    let mut harness = harness(&backend.uri());

    assert_eq!(harness.register_user().await, Registration::AlreadyExists);
    assert_eq!(harness.login().await, Outcome::Pass);
    assert_eq!(harness.get_profile().await, Outcome::Pass);

    let report = harness.finish();
    let register = report.step(steps::REGISTER).unwrap();
    assert!(register.passed());
    assert!(register.failure.is_none());

    let sent = backend.requests().await;
    let register_body: serde_json::Value = serde_json::from_slice(&sent[0].body).unwrap();
    let login_body: serde_json::Value = serde_json::from_slice(&sent[1].body).unwrap();
    assert_eq!(register_body["email"], login_body["email"]);
    assert_eq!(register_body["password"], login_body["password"]);
}

#[tokio::test]
async fn other_registration_errors_fail_the_step() {
    let backend = MockBackend::start().await;
    backend
        .respond(
            "POST",
            paths::REGISTER,
            500,
            serde_json::json!({"message": "database unavailable"}),
        )
        .await;

    let mut harness = harness(&backend.uri());
    assert_eq!(harness.register_user().await, Registration::Failed);

    let report = harness.finish();
    let failure = report.steps[0].failure.as_ref().unwrap();
    assert_eq!(failure.status(), Some(500));
}

#[tokio::test]
async fn login_failure_skips_authenticated_steps_without_requests() {
    let backend = MockBackend::start().await;
    backend.healthy().await;
    backend.registers().await;
    backend.login_fails().await;
    backend.profile(TOKEN).await;
    backend.dashboard(TOKEN).await;
    backend
        .accepts_classification(TOKEN)
        .await;
    backend.public_lists().await;

    let report = harness(&backend.uri()).run().await;

    for name in AUTHENTICATED {
        let step = report.step(name).unwrap();
        assert_eq!(step.outcome, Outcome::Fail);
        assert!(matches!(
            step.failure,
            Some(Failure::Skipped {
                prerequisite: Prerequisite::SessionToken
            })
        ));
    }

    assert_eq!(backend.hits(paths::PROFILE).await, 0);
    assert_eq!(backend.hits(paths::DASHBOARD).await, 0);
    assert_eq!(backend.hits(paths::CLASSIFICATION).await, 0);

    // unauthenticated steps still run
    for resource in PublicResource::ALL {
        assert!(report.step(resource.name).unwrap().passed());
    }

    assert_eq!(report.summary.total, 9);
    assert_eq!(report.summary.failed, 4);
    assert_eq!(
        report.summary.passed + report.summary.failed,
        report.summary.total
    );
}

#[tokio::test]
async fn authenticated_step_before_login_is_skipped() {
    let backend = MockBackend::happy().await;
    let mut harness = harness(&backend.uri());

    assert_eq!(harness.get_dashboard().await, Outcome::Fail);
    assert!(harness.context().session().is_none());
    assert!(backend.requests().await.is_empty());
}

#[tokio::test]
async fn classification_fixture_passes_on_2xx() {
    let backend = MockBackend::happy().await;
    let mut harness = harness(&backend.uri());

    harness.login().await;
    assert_eq!(harness.submit_classification().await, Outcome::Pass);

    let sent = backend.requests().await;
    let body: ClassificationSubmission = serde_json::from_slice(&sent[1].body).unwrap();
    assert_eq!(body, ClassificationSubmission::fixture());
}

#[tokio::test]
async fn classification_validation_rejection_is_distinguished() {
    let backend = MockBackend::start().await;
    backend.logs_in(TOKEN).await;
    backend
        .rejects_classification(TOKEN)
        .await;

    let mut harness = harness(&backend.uri());
    harness.login().await;
    assert_eq!(harness.submit_classification().await, Outcome::Fail);

    let report = harness.finish();
    match &report.step(steps::CLASSIFICATION).unwrap().failure {
        Some(Failure::Application {
            status: 400,
            class: ErrorClass::Validation { fields },
            body,
            ..
        }) => {
            assert_eq!(fields[0].field, "confidence");
            assert!(body.get("errors").is_some());
        },
        other => panic!("expected validation rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn classification_server_error_is_distinguished() {
    let backend = MockBackend::start().await;
    backend.logs_in(TOKEN).await;
    backend
        .classification_crashes(TOKEN)
        .await;

    let mut harness = harness(&backend.uri());
    harness.login().await;
    harness.submit_classification().await;

    let report = harness.finish();
    match &report.step(steps::CLASSIFICATION).unwrap().failure {
        Some(Failure::Application {
            status: 500,
            class: ErrorClass::Server,
            message,
            ..
        }) => assert_eq!(message.as_deref(), Some("Internal server error")),
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_submission_is_not_sent() {
    let backend = MockBackend::happy().await;
    let client = ApiClient::new(&backend.uri(), DEFAULT_TIMEOUT).unwrap();
    let mut submission = ClassificationSubmission::fixture();
    submission.image_url = "not a url".into();

    let mut harness = Harness::new(RunContext::new(client, credentials()).with_submission(submission));
    harness.login().await;
    harness.submit_classification().await;

    let report = harness.finish();
    assert!(matches!(
        report.step(steps::CLASSIFICATION).unwrap().failure,
        Some(Failure::Request { .. })
    ));
    assert_eq!(backend.hits(paths::CLASSIFICATION).await, 0);
}

#[tokio::test]
async fn shape_mismatch_is_its_own_category() {
    let backend = MockBackend::start().await;
    backend.logs_in(TOKEN).await;
    backend
        .dashboard_without_stats(TOKEN)
        .await;

    let mut harness = harness(&backend.uri());
    harness.login().await;
    assert_eq!(harness.get_dashboard().await, Outcome::Fail);

    let report = harness.finish();
    let failure = report
        .step(steps::DASHBOARD)
        .unwrap()
        .failure
        .as_ref()
        .unwrap();
    assert!(matches!(failure, Failure::Shape { .. }));
    assert_eq!(failure.status(), None);
}

#[tokio::test]
async fn login_without_token_is_shape_failure() {
    let backend = MockBackend::start().await;
    backend
        .respond(
            "POST",
            paths::LOGIN,
            200,
            serde_json::json!({"message": "Login successful"}),
        )
        .await;

    let mut harness = harness(&backend.uri());
    assert_eq!(harness.login().await, Outcome::Fail);
    assert!(harness.context().session().is_none());
}

#[tokio::test]
async fn token_nested_under_data_is_accepted() {
    let backend = MockBackend::start().await;
    backend
        .respond(
            "POST",
            paths::LOGIN,
            200,
            serde_json::json!({"message": "ok", "data": {"token": TOKEN}}),
        )
        .await;
    backend.profile(TOKEN).await;

    let mut harness = harness(&backend.uri());
    harness.login().await;
    assert_eq!(harness.get_profile().await, Outcome::Pass);

    let report = harness.finish();
    let login = report.step(steps::LOGIN).unwrap();
    assert_eq!(
        login.payload.as_ref().unwrap()["data"]["token"],
        "[redacted]"
    );
}

#[tokio::test]
async fn unreachable_backend_still_produces_report() {
    let report = harness(UNREACHABLE_URL).run().await;

    let health = report.step(steps::HEALTH).unwrap();
    assert!(health.failure.as_ref().unwrap().is_transport());

    assert_eq!(report.summary.total, 9);
    assert_eq!(report.summary.passed, 0);
    for name in AUTHENTICATED {
        assert!(
            report
                .step(name)
                .unwrap()
                .failure
                .as_ref()
                .unwrap()
                .is_skipped()
        );
    }

    let rendered = report.to_string();
    assert!(rendered.contains("❌ health"));
    assert!(rendered.ends_with("Summary: 9 steps, 0 passed, 9 failed"));
}

#[tokio::test]
async fn login_only_mode_skips_registration() {
    let backend = MockBackend::happy().await;

    let report = harness(&backend.uri())
        .with_registration(false)
        .run()
        .await;

    assert!(report.step(steps::REGISTER).is_none());
    assert_eq!(backend.hits(paths::REGISTER).await, 0);
    assert!(report.is_success());
}

#[tokio::test]
async fn slow_health_check_times_out() {
    let backend = MockBackend::start().await;
    backend
        .slow_health(Duration::from_secs(2))
        .await;
    let client = ApiClient::new(&backend.uri(), Duration::from_millis(200)).unwrap();

    let mut harness = Harness::new(RunContext::new(client, credentials()));
    assert_eq!(harness.run_health_check().await, Outcome::Fail);

    let report = harness.finish();
    match &report.steps[0].failure {
        Some(Failure::Transport { transport, .. }) => {
            assert_eq!(*transport, ecosort_client::TransportKind::Timeout)
        },
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl StepObserver for Recorder {
    fn started(
        &self,
        name: &str,
    ) {
        self.0
            .lock()
            .unwrap()
            .push(format!("start {name}"));
    }

    fn finished(
        &self,
        result: &StepResult,
    ) {
        self.0
            .lock()
            .unwrap()
            .push(format!("end {}", result.name));
    }
}

#[tokio::test]
async fn observer_sees_every_step() {
    let backend = MockBackend::happy().await;
    let recorder = Recorder::default();

    harness(&backend.uri())
        .with_observer(recorder.clone())
        .run()
        .await;

    let events = recorder.0.lock().unwrap().clone();
    assert_eq!(events.len(), 18);
    assert_eq!(events[0], "start health");
    assert_eq!(events[1], "end health");
    assert_eq!(events[17], "end map locations");
}
