//! Settings round trips through the channel against the background
//! process double.

use crate::helpers::spawn_background;

use control_core::channel::Channel;
use control_core::settings::SettingValueStore;

use common::{SettingKey, Theme};

use serde_json::json;

#[tokio::test]
async fn given_stored_value_when_set_then_get_then_same_value_comes_back() {
    let (channel, outbound_rx) = Channel::new();
    spawn_background(channel.clone(), outbound_rx);
    let store = SettingValueStore::spawn(channel);

    let acknowledged = store.set(SettingKey::Method, json!("warp")).await.unwrap();
    assert_eq!(acknowledged, Some(json!("warp")));

    let read_back = store.get(SettingKey::Method).await.unwrap();
    assert_eq!(read_back, Some(json!("warp")));
}

#[tokio::test]
async fn given_empty_store_when_read_then_none_comes_back() {
    let (channel, outbound_rx) = Channel::new();
    spawn_background(channel.clone(), outbound_rx);
    let store = SettingValueStore::spawn(channel);

    assert_eq!(store.get(SettingKey::Method).await.unwrap(), None);
}

#[tokio::test]
async fn given_empty_store_when_theme_read_then_default_applies() {
    let (channel, outbound_rx) = Channel::new();
    spawn_background(channel.clone(), outbound_rx);
    let store = SettingValueStore::spawn(channel);

    assert_eq!(store.theme().await.unwrap(), Theme::default());
}

#[tokio::test]
async fn given_stored_theme_when_read_then_it_overrides_the_default() {
    let (channel, outbound_rx) = Channel::new();
    let values = spawn_background(channel.clone(), outbound_rx);
    values
        .lock()
        .await
        .insert(SettingKey::Theme, json!("dark"));
    let store = SettingValueStore::spawn(channel);

    assert_eq!(store.theme().await.unwrap(), Theme::Dark);
}

#[tokio::test]
async fn given_independent_keys_when_requested_concurrently_then_both_resolve() {
    let (channel, outbound_rx) = Channel::new();
    let values = spawn_background(channel.clone(), outbound_rx);
    {
        let mut values = values.lock().await;
        values.insert(SettingKey::Theme, json!("dark"));
        values.insert(SettingKey::Method, json!("gool"));
    }
    let store = SettingValueStore::spawn(channel);

    let (theme, method) = tokio::join!(store.get(SettingKey::Theme), store.get(SettingKey::Method));

    assert_eq!(theme.unwrap(), Some(json!("dark")));
    assert_eq!(method.unwrap(), Some(json!("gool")));
}
