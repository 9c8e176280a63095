// Unit tests for connection state helpers
// The busy/connected flags drive advisory dismissal and probe gating,
// so their mapping from states must stay exact.

use crate::ConnectionState;

#[test]
fn given_each_state_when_is_busy_then_only_transitions_report_busy() {
    assert!(!ConnectionState::Disconnected.is_busy());
    assert!(ConnectionState::Connecting.is_busy());
    assert!(!ConnectionState::Connected.is_busy());
    assert!(ConnectionState::Disconnecting.is_busy());
}

#[test]
fn given_each_state_when_is_connected_then_only_connected_reports_true() {
    assert!(!ConnectionState::Disconnected.is_connected());
    assert!(!ConnectionState::Connecting.is_connected());
    assert!(ConnectionState::Connected.is_connected());
    assert!(!ConnectionState::Disconnecting.is_connected());
}

#[test]
fn given_process_start_when_default_then_state_is_disconnected() {
    // Connection state is never persisted; every process start begins
    // from Disconnected.
    assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
}

#[test]
fn given_state_when_serialized_then_uses_lowercase_labels() {
    let json = serde_json::to_string(&ConnectionState::Connecting).unwrap();
    assert_eq!(json, "\"connecting\"");
}
