// ABOUTME: Tests for the create-or-update reconcile path against a fake platform.
// ABOUTME: Covers idempotence, readiness polling, and the ready-timeout warning.

mod support;

use std::time::Duration;

use caravel::diagnostics::{Diagnostics, WarningKind};
use caravel::platform::PlatformErrorKind;
use caravel::provision::{ProvisionError, Provisioner, StackDescriptor};
use support::{Call, FakePlatform};

fn stack() -> StackDescriptor {
    StackDescriptor::for_target(&support::target())
}

fn provisioner(platform: &FakePlatform, budget: u32) -> Provisioner<'_, FakePlatform> {
    Provisioner::new(platform, Duration::from_millis(1), budget)
}

#[tokio::test]
async fn reconcile_creates_a_missing_service() {
    let platform = FakePlatform::new();
    let mut diagnostics = Diagnostics::default();

    let state = provisioner(&platform, 5)
        .reconcile(&stack(), &mut diagnostics)
        .await
        .unwrap();

    assert!(state.is_ready());
    assert!(!diagnostics.has_warnings());
    assert_eq!(platform.created_count("app"), 1);
    assert_eq!(
        platform.calls(),
        vec![
            Call::StackExists("app".to_string()),
            Call::SubmitStack("app".to_string()),
            Call::ServiceState("app".to_string()),
        ]
    );
}

#[tokio::test]
async fn reconcile_is_idempotent_across_runs() {
    let platform = FakePlatform::new();
    let p = provisioner(&platform, 5);

    let mut diagnostics = Diagnostics::default();
    p.reconcile(&stack(), &mut diagnostics).await.unwrap();
    let mut diagnostics = Diagnostics::default();
    p.reconcile(&stack(), &mut diagnostics).await.unwrap();

    // Second submission is an update, not a second create.
    assert_eq!(platform.created_count("app"), 1);
}

#[tokio::test]
async fn reconcile_polls_until_ready() {
    let platform = FakePlatform::new().with_existing_service("app");
    platform.queue_service_states(&["PENDING", "UPDATING", "RUNNING"]);
    let mut diagnostics = Diagnostics::default();

    let state = provisioner(&platform, 10)
        .reconcile(&stack(), &mut diagnostics)
        .await
        .unwrap();

    assert_eq!(state.as_str(), "RUNNING");
    let queries = platform
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::ServiceState(_)))
        .count();
    assert_eq!(queries, 3);
}

#[tokio::test]
async fn ready_timeout_warns_but_does_not_fail() {
    let platform = FakePlatform::new();
    platform.queue_service_states(&["PENDING", "PENDING", "PENDING"]);
    let mut diagnostics = Diagnostics::default();

    let state = provisioner(&platform, 3)
        .reconcile(&stack(), &mut diagnostics)
        .await
        .unwrap();

    assert_eq!(state.as_str(), "PENDING");
    let warnings = diagnostics.into_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::ReadyTimeout);
    assert!(warnings[0].message.contains("3 attempts"));
}

#[tokio::test]
async fn invalid_template_makes_no_remote_calls() {
    let platform = FakePlatform::new();
    let mut bad = stack();
    bad.parameters.remove("scale");
    let mut diagnostics = Diagnostics::default();

    let err = provisioner(&platform, 3)
        .reconcile(&bad, &mut diagnostics)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::TemplateInvalid { .. }));
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn rejected_submission_surfaces_platform_detail() {
    let mut platform = FakePlatform::new();
    platform.reject_submission = true;
    let mut diagnostics = Diagnostics::default();

    let err = provisioner(&platform, 3)
        .reconcile(&stack(), &mut diagnostics)
        .await
        .unwrap_err();

    match err {
        ProvisionError::Rejected(detail) => assert!(detail.contains("InvalidInputException")),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn broken_cli_is_not_a_rejection() {
    let mut platform = FakePlatform::new();
    platform.submit_spawn_error = true;
    let mut diagnostics = Diagnostics::default();

    let err = provisioner(&platform, 3)
        .reconcile(&stack(), &mut diagnostics)
        .await
        .unwrap_err();

    // A missing or broken CLI binary is a platform error, not a refusal.
    match err {
        ProvisionError::Platform(e) => assert_eq!(e.kind(), PlatformErrorKind::Spawn),
        other => panic!("expected Platform, got {other:?}"),
    }
}
