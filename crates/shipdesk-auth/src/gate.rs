//! Origin allow-listing and the login-attempt/lockout state machine.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shipdesk_audit::{AuditLog, CreateSecurityEvent, SecurityAction};
use shipdesk_core::config::AccessConfig;

/// Per-identity failed-attempt bookkeeping.
///
/// Created on the first attempt, mutated on every subsequent one, and
/// reset rather than deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// The identity (email) this record tracks.
    pub identity: String,
    /// Consecutive failures inside the attempt window.
    pub fail_count: u32,
    /// When the identity last attempted a login.
    pub last_attempt_at: DateTime<Utc>,
}

/// Whether a recorded attempt ended as a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials were accepted by the caller.
    Success,
    /// Credentials were rejected by the caller.
    Failure,
}

/// Gate decision for a recorded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The attempt may proceed (it was counted, but no lockout applies).
    Allowed,
    /// The identity is locked until the contained instant.
    Locked(DateTime<Utc>),
}

/// Serializable copy of the gate's mutable state, used by the vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateSnapshot {
    /// All tracked attempt records.
    pub attempts: Vec<AttemptRecord>,
    /// Identities currently locked out.
    pub lockouts: Vec<String>,
}

#[derive(Debug, Default)]
struct GateState {
    attempts: HashMap<String, AttemptRecord>,
    lockouts: HashSet<String>,
}

/// Gatekeeps the admin interface against brute-force credential guessing.
///
/// Attempt and lockout state live behind a single mutex so each decision
/// runs to completion against a consistent view.
#[derive(Debug)]
pub struct AccessGate {
    state: Mutex<GateState>,
    audit: Arc<AuditLog>,
    allowlist: Vec<IpAddr>,
    max_attempts: u32,
    attempt_window: Duration,
    lockout_duration: Duration,
}

impl AccessGate {
    /// Creates a gate from configuration with empty attempt state.
    pub fn new(config: &AccessConfig, audit: Arc<AuditLog>) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            audit,
            allowlist: config.allowlist.clone(),
            max_attempts: config.max_attempts,
            attempt_window: Duration::minutes(config.attempt_window_minutes as i64),
            lockout_duration: Duration::minutes(config.lockout_duration_minutes as i64),
        }
    }

    /// Checks a request origin against the allow-list.
    ///
    /// An empty allow-list disables origin restriction. A rejected origin
    /// is audited; an accepted one has no side effect.
    pub fn validate_origin(&self, ip: IpAddr) -> bool {
        if self.allowlist.is_empty() || self.allowlist.contains(&ip) {
            return true;
        }
        warn!(origin = %ip, "admin access denied: origin not allow-listed");
        self.audit.append(CreateSecurityEvent::denial(
            SecurityAction::IpAccessDenied,
            "admin-interface",
            ip,
        ));
        false
    }

    /// Records a login attempt for `identity` and returns the gate decision.
    pub fn record_attempt(
        &self,
        identity: &str,
        ip: IpAddr,
        outcome: LoginOutcome,
    ) -> AttemptOutcome {
        self.record_attempt_at(identity, ip, outcome, Utc::now())
    }

    /// [`AccessGate::record_attempt`] with an explicit clock, for
    /// deterministic evaluation.
    pub fn record_attempt_at(
        &self,
        identity: &str,
        ip: IpAddr,
        outcome: LoginOutcome,
        now: DateTime<Utc>,
    ) -> AttemptOutcome {
        let mut state = self.state.lock().expect("gate state poisoned");

        let Some(record) = state.attempts.get(identity).cloned() else {
            let fail_count = match outcome {
                LoginOutcome::Success => 0,
                LoginOutcome::Failure => 1,
            };
            state.attempts.insert(
                identity.to_string(),
                AttemptRecord {
                    identity: identity.to_string(),
                    fail_count,
                    last_attempt_at: now,
                },
            );
            drop(state);
            self.log_attempt(identity, ip, outcome);
            return AttemptOutcome::Allowed;
        };

        if state.lockouts.contains(identity) {
            let lockout_end = record.last_attempt_at + self.lockout_duration;
            if now < lockout_end {
                drop(state);
                self.audit.append(CreateSecurityEvent {
                    actor_id: None,
                    actor_email: Some(identity.to_string()),
                    action: SecurityAction::LoginAttemptLocked,
                    resource: "admin-login".to_string(),
                    origin: Some(ip),
                    success: false,
                    details: Some(serde_json::json!({ "locked_until": lockout_end })),
                });
                return AttemptOutcome::Locked(lockout_end);
            }
            // Lockout has expired; the identity starts over.
            state.lockouts.remove(identity);
            if let Some(r) = state.attempts.get_mut(identity) {
                r.fail_count = 0;
            }
        }

        match outcome {
            LoginOutcome::Success => {
                if let Some(r) = state.attempts.get_mut(identity) {
                    r.fail_count = 0;
                    r.last_attempt_at = now;
                }
                drop(state);
                self.log_attempt(identity, ip, outcome);
                AttemptOutcome::Allowed
            }
            LoginOutcome::Failure => {
                let record = state
                    .attempts
                    .get_mut(identity)
                    .expect("attempt record exists");
                // Boundary attempts count as inside the window.
                if now - record.last_attempt_at < self.attempt_window {
                    record.fail_count += 1;
                } else {
                    record.fail_count = 1;
                }
                record.last_attempt_at = now;

                if record.fail_count >= self.max_attempts {
                    let until = now + self.lockout_duration;
                    state.lockouts.insert(identity.to_string());
                    drop(state);
                    warn!(identity, "identity locked out after repeated failures");
                    self.audit.append(CreateSecurityEvent {
                        actor_id: None,
                        actor_email: Some(identity.to_string()),
                        action: SecurityAction::AccountLocked,
                        resource: "admin-login".to_string(),
                        origin: Some(ip),
                        success: false,
                        details: Some(serde_json::json!({ "locked_until": until })),
                    });
                    AttemptOutcome::Locked(until)
                } else {
                    drop(state);
                    self.log_attempt(identity, ip, outcome);
                    AttemptOutcome::Allowed
                }
            }
        }
    }

    /// Returns when the identity's lockout expires, if it is locked.
    pub fn locked_until(&self, identity: &str) -> Option<DateTime<Utc>> {
        let state = self.state.lock().expect("gate state poisoned");
        if !state.lockouts.contains(identity) {
            return None;
        }
        state
            .attempts
            .get(identity)
            .map(|r| r.last_attempt_at + self.lockout_duration)
    }

    /// Drops unlocked records whose last attempt predates the window.
    ///
    /// Never called internally; long-running hosts invoke this to bound
    /// memory growth from stale identities.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.lock().expect("gate state poisoned");
        let window = self.attempt_window;
        let lockouts = state.lockouts.clone();
        let before = state.attempts.len();
        state
            .attempts
            .retain(|id, r| lockouts.contains(id) || now - r.last_attempt_at < window);
        before - state.attempts.len()
    }

    /// Copies the gate's mutable state for backup.
    pub fn snapshot(&self) -> GateSnapshot {
        let state = self.state.lock().expect("gate state poisoned");
        let mut attempts: Vec<AttemptRecord> = state.attempts.values().cloned().collect();
        attempts.sort_by(|a, b| a.identity.cmp(&b.identity));
        let mut lockouts: Vec<String> = state.lockouts.iter().cloned().collect();
        lockouts.sort();
        GateSnapshot { attempts, lockouts }
    }

    /// Replaces the gate's mutable state wholesale from a backup.
    ///
    /// Lockouts without a matching attempt record are discarded to keep
    /// the lockout-implies-record invariant.
    pub fn restore(&self, snapshot: GateSnapshot) {
        let mut state = self.state.lock().expect("gate state poisoned");
        state.attempts = snapshot
            .attempts
            .into_iter()
            .map(|r| (r.identity.clone(), r))
            .collect();
        state.lockouts = snapshot
            .lockouts
            .into_iter()
            .filter(|id| state.attempts.contains_key(id))
            .collect();
        info!(
            attempts = state.attempts.len(),
            lockouts = state.lockouts.len(),
            "gate state restored"
        );
    }

    fn log_attempt(&self, identity: &str, ip: IpAddr, outcome: LoginOutcome) {
        let (action, success) = match outcome {
            LoginOutcome::Success => (SecurityAction::LoginSuccess, true),
            LoginOutcome::Failure => (SecurityAction::LoginFailed, false),
        };
        self.audit.append(CreateSecurityEvent {
            actor_id: None,
            actor_email: Some(identity.to_string()),
            action,
            resource: "admin-login".to_string(),
            origin: Some(ip),
            success,
            details: None,
        });
    }
}
