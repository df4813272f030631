//! End-to-end lockout scenario through the security store.

use chrono::{Duration, Utc};

use shipdesk_audit::{EventFilter, SecurityAction};
use shipdesk_auth::{AttemptOutcome, LoginOutcome};
use shipdesk_core::SecurityError;
use shipdesk_core::config::SecurityConfig;
use shipdesk_service::SecurityStore;

fn ip() -> std::net::IpAddr {
    "198.51.100.7".parse().unwrap()
}

#[test]
fn five_failures_lock_then_window_reopens() {
    let store = SecurityStore::new(&SecurityConfig::default());
    let start = Utc::now();

    // Five failures within two minutes: the fifth locks.
    for i in 0..4 {
        let outcome = store.gate.record_attempt_at(
            "a@b.com",
            ip(),
            LoginOutcome::Failure,
            start + Duration::seconds(i * 25),
        );
        assert_eq!(outcome, AttemptOutcome::Allowed);
    }
    let fifth = store.gate.record_attempt_at(
        "a@b.com",
        ip(),
        LoginOutcome::Failure,
        start + Duration::minutes(2),
    );
    assert!(matches!(fifth, AttemptOutcome::Locked(_)));

    // An immediate sixth call is still rejected.
    let sixth = store.gate.record_attempt_at(
        "a@b.com",
        ip(),
        LoginOutcome::Failure,
        start + Duration::minutes(2),
    );
    assert!(matches!(sixth, AttemptOutcome::Locked(_)));

    // Sixteen minutes later the lockout has lapsed; the next failure is
    // allowed and counts as a fresh first attempt.
    let after = store.gate.record_attempt_at(
        "a@b.com",
        ip(),
        LoginOutcome::Failure,
        start + Duration::minutes(2) + Duration::minutes(16),
    );
    assert_eq!(after, AttemptOutcome::Allowed);
    assert_eq!(store.gate.snapshot().attempts[0].fail_count, 1);
}

#[test]
fn lockout_is_audited_and_queryable() {
    let store = SecurityStore::new(&SecurityConfig::default());
    for _ in 0..5 {
        let _ = store.record_attempt("a@b.com", ip(), LoginOutcome::Failure);
    }

    let locked = store.audit.query(&EventFilter {
        action: Some(SecurityAction::AccountLocked),
        ..Default::default()
    });
    assert_eq!(locked.len(), 1);
    assert_eq!(locked[0].actor_email.as_deref(), Some("a@b.com"));

    // The facade surfaces the lockout as a typed error with its expiry.
    let err = store
        .record_attempt("a@b.com", ip(), LoginOutcome::Failure)
        .unwrap_err();
    match err {
        SecurityError::AccountLocked { until } => assert!(until > Utc::now()),
        other => panic!("expected AccountLocked, got {other}"),
    }
}

#[test]
fn failures_across_identities_are_independent() {
    let store = SecurityStore::new(&SecurityConfig::default());
    for _ in 0..5 {
        let _ = store.record_attempt("a@b.com", ip(), LoginOutcome::Failure);
    }
    assert!(store.gate.locked_until("a@b.com").is_some());
    assert!(store.gate.locked_until("b@b.com").is_none());
    assert!(
        store
            .record_attempt("b@b.com", ip(), LoginOutcome::Failure)
            .is_ok()
    );
}
