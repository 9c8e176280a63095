// Unit tests for Channel wire shapes and plumbing
// The JSON shapes are fixed by the background process; a drifting field
// name here breaks the whole control surface silently.

use crate::channel::{Channel, Inbound, Outbound, SettingsRequest, TunnelCommand};

use common::SettingKey;

use serde_json::json;

#[test]
fn given_settings_get_when_serialized_then_matches_wire_shape() {
    let message = Outbound::Settings(SettingsRequest::Get {
        key: SettingKey::Theme,
    });

    let encoded = serde_json::to_value(&message).unwrap();
    assert_eq!(encoded, json!({"mode": "get", "key": "theme"}));
}

#[test]
fn given_settings_set_when_serialized_then_carries_value() {
    let message = Outbound::Settings(SettingsRequest::Set {
        key: SettingKey::Theme,
        value: json!("dark"),
    });

    let encoded = serde_json::to_value(&message).unwrap();
    assert_eq!(
        encoded,
        json!({"mode": "set", "key": "theme", "value": "dark"})
    );
}

#[test]
fn given_tunnel_commands_when_serialized_then_use_command_tag() {
    let start = serde_json::to_value(Outbound::Tunnel(TunnelCommand::Start)).unwrap();
    let stop = serde_json::to_value(Outbound::Tunnel(TunnelCommand::Stop)).unwrap();

    assert_eq!(start, json!({"command": "start"}));
    assert_eq!(stop, json!({"command": "stop"}));
}

/// **VALUE**: Verifies inbound frames are classified by the fields they
/// carry, the only discriminator the background process provides.
///
/// **WHY THIS MATTERS**: Inbound decoding is untagged; if variant order
/// or field requirements drift, acknowledgements could decode as
/// settings responses (or vice versa) and the state machine would stall.
///
/// **BUG THIS CATCHES**: Would catch a reordering of the `Inbound`
/// variants or a `value` field made mandatory.
#[test]
fn given_inbound_frames_when_deserialized_then_classified_by_fields() {
    let started: Inbound = serde_json::from_value(json!({"started": true})).unwrap();
    let stopped: Inbound = serde_json::from_value(json!({"stopped": false})).unwrap();
    let settings: Inbound =
        serde_json::from_value(json!({"key": "theme", "value": "dark"})).unwrap();
    let empty_settings: Inbound = serde_json::from_value(json!({"key": "theme"})).unwrap();

    assert_eq!(started, Inbound::Started { started: true });
    assert_eq!(stopped, Inbound::Stopped { stopped: false });
    assert_eq!(
        settings,
        Inbound::Settings {
            key: SettingKey::Theme,
            value: Some(json!("dark")),
        }
    );
    assert_eq!(
        empty_settings,
        Inbound::Settings {
            key: SettingKey::Theme,
            value: None,
        }
    );
}

#[tokio::test]
async fn given_no_subscribers_when_publish_then_message_is_dropped_without_error() {
    let (channel, _outbound_rx) = Channel::new();

    // Nothing is subscribed; this must not panic or error.
    channel.publish(Inbound::Started { started: true });
}

#[tokio::test]
async fn given_dropped_outbound_receiver_when_send_then_returns_closed() {
    let (channel, outbound_rx) = Channel::new();
    drop(outbound_rx);

    let result = channel.send(Outbound::Tunnel(TunnelCommand::Start)).await;
    assert!(result.is_err(), "send into a dead bridge must fail");
}

#[tokio::test]
async fn given_two_subscribers_when_publish_then_both_receive_the_message() {
    let (channel, _outbound_rx) = Channel::new();

    let mut first = channel.subscribe();
    let mut second = channel.subscribe();

    channel.publish(Inbound::Stopped { stopped: true });

    assert_eq!(first.recv().await.unwrap(), Inbound::Stopped { stopped: true });
    assert_eq!(second.recv().await.unwrap(), Inbound::Stopped { stopped: true });
}
