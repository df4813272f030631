//! The bounded append-only audit log.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use shipdesk_core::SecurityResult;
use shipdesk_core::config::AuditConfig;

use crate::event::{CreateSecurityEvent, SecurityAction, SecurityEvent};

/// Filters applied when querying the audit log.
///
/// Every field is optional; an empty filter matches all events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Earliest timestamp to include (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Latest timestamp to include (inclusive).
    pub to: Option<DateTime<Utc>>,
    /// Only events by this actor.
    pub actor_id: Option<Uuid>,
    /// Only events recording this action.
    pub action: Option<SecurityAction>,
    /// Only events with this outcome.
    pub success: Option<bool>,
}

impl EventFilter {
    fn matches(&self, event: &SecurityEvent) -> bool {
        if let Some(from) = self.from
            && event.timestamp < from
        {
            return false;
        }
        if let Some(to) = self.to
            && event.timestamp > to
        {
            return false;
        }
        if let Some(actor_id) = self.actor_id
            && event.actor_id != Some(actor_id)
        {
            return false;
        }
        if let Some(action) = self.action
            && event.action != action
        {
            return false;
        }
        if let Some(success) = self.success
            && event.success != success
        {
            return false;
        }
        true
    }
}

/// Bounded, queryable, append-only event store.
///
/// The append-and-evict step runs under a single lock, so insertion order
/// is preserved even with concurrent appenders and the buffer never
/// exceeds its capacity after `append` returns.
#[derive(Debug)]
pub struct AuditLog {
    /// Ring buffer in insertion order, oldest first.
    buffer: Mutex<VecDeque<SecurityEvent>>,
    /// Maximum number of retained events.
    capacity: usize,
}

impl AuditLog {
    /// Creates an empty log with the configured capacity.
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(config.capacity)),
            capacity: config.capacity,
        }
    }

    /// Assigns an id and timestamp, appends, and evicts the oldest entry
    /// if the buffer would exceed its capacity.
    pub fn append(&self, event: CreateSecurityEvent) -> SecurityEvent {
        let stored = SecurityEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id: event.actor_id,
            actor_email: event.actor_email,
            action: event.action,
            resource: event.resource,
            origin: event.origin,
            success: event.success,
            details: event.details,
        };

        let mut buffer = self.buffer.lock().expect("audit buffer poisoned");
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(stored.clone());
        debug!(action = %stored.action, success = stored.success, "audit event recorded");
        stored
    }

    /// Returns matching events sorted descending by timestamp.
    pub fn query(&self, filter: &EventFilter) -> Vec<SecurityEvent> {
        let buffer = self.buffer.lock().expect("audit buffer poisoned");
        let mut events: Vec<SecurityEvent> = buffer
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events
    }

    /// Serializes the full buffer, oldest first.
    pub fn export(&self) -> SecurityResult<serde_json::Value> {
        let buffer = self.buffer.lock().expect("audit buffer poisoned");
        Ok(serde_json::to_value(buffer.iter().collect::<Vec<_>>())?)
    }

    /// Returns a copy of the full buffer, oldest first.
    pub fn snapshot(&self) -> Vec<SecurityEvent> {
        let buffer = self.buffer.lock().expect("audit buffer poisoned");
        buffer.iter().cloned().collect()
    }

    /// Replaces the buffer wholesale, truncating to capacity (oldest
    /// entries dropped first). Used by vault restore.
    pub fn replace(&self, events: Vec<SecurityEvent>) {
        let mut buffer = self.buffer.lock().expect("audit buffer poisoned");
        buffer.clear();
        let skip = events.len().saturating_sub(self.capacity);
        buffer.extend(events.into_iter().skip(skip));
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.buffer.lock().expect("audit buffer poisoned").len()
    }

    /// Whether the log holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_log(capacity: usize) -> AuditLog {
        AuditLog::new(&AuditConfig { capacity })
    }

    fn failed_login(email: &str) -> CreateSecurityEvent {
        CreateSecurityEvent {
            actor_id: None,
            actor_email: Some(email.to_string()),
            action: SecurityAction::LoginFailed,
            resource: "admin-login".to_string(),
            origin: Some("10.0.0.1".parse().unwrap()),
            success: false,
            details: None,
        }
    }

    #[test]
    fn test_append_assigns_id_and_timestamp() {
        let log = make_log(10);
        let stored = log.append(failed_login("a@b.com"));
        assert!(!stored.id.is_nil());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let log = make_log(1000);
        let first = log.append(failed_login("first@b.com"));
        for _ in 0..1000 {
            log.append(failed_login("a@b.com"));
        }
        assert_eq!(log.len(), 1000);
        let all = log.query(&EventFilter::default());
        assert!(all.iter().all(|e| e.id != first.id));
    }

    #[test]
    fn test_query_sorted_descending() {
        let log = make_log(10);
        for _ in 0..5 {
            log.append(failed_login("a@b.com"));
        }
        let events = log.query(&EventFilter::default());
        assert_eq!(events.len(), 5);
        for pair in events.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn test_query_filters_by_action_and_success() {
        let log = make_log(10);
        log.append(failed_login("a@b.com"));
        log.append(CreateSecurityEvent {
            success: true,
            action: SecurityAction::LoginSuccess,
            ..failed_login("a@b.com")
        });

        let failures = log.query(&EventFilter {
            success: Some(false),
            ..Default::default()
        });
        assert_eq!(failures.len(), 1);

        let successes = log.query(&EventFilter {
            action: Some(SecurityAction::LoginSuccess),
            ..Default::default()
        });
        assert_eq!(successes.len(), 1);
        assert!(successes[0].success);
    }

    #[test]
    fn test_replace_truncates_to_capacity() {
        let log = make_log(3);
        let events: Vec<SecurityEvent> = (0..5).map(|_| log.append(failed_login("a@b.com"))).collect();
        log.replace(events.clone());
        assert_eq!(log.len(), 3);
        // Oldest entries are the ones dropped.
        let kept = log.snapshot();
        assert_eq!(kept[0].id, events[2].id);
    }
}
