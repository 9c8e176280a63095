// Unit tests for setting keys, theme values, and home-region detection

use crate::{IpInfo, SettingKey, Theme};

/// **VALUE**: Verifies setting keys serialize to the exact wire names the
/// background process matches on.
///
/// **WHY THIS MATTERS**: The background store keys its map by these
/// strings. A renamed variant would silently stop round-tripping values.
///
/// **BUG THIS CATCHES**: Would catch a serde attribute change that turns
/// `theme` into `Theme` on the wire.
#[test]
fn given_setting_keys_when_serialized_then_match_wire_names() {
    assert_eq!(serde_json::to_string(&SettingKey::Theme).unwrap(), "\"theme\"");
    assert_eq!(
        serde_json::to_string(&SettingKey::Method).unwrap(),
        "\"method\""
    );
}

#[test]
fn given_no_stored_theme_when_defaulted_then_falls_back_to_light() {
    assert_eq!(Theme::default(), Theme::Light);
}

#[test]
fn given_theme_json_when_deserialized_then_recognizes_both_values() {
    let light: Theme = serde_json::from_str("\"light\"").unwrap();
    let dark: Theme = serde_json::from_str("\"dark\"").unwrap();
    assert_eq!(light, Theme::Light);
    assert_eq!(dark, Theme::Dark);
}

#[test]
fn given_home_region_code_when_checked_then_ip_info_reports_home_region() {
    let home = IpInfo {
        ip: "203.0.113.5".to_string(),
        country_code: Some("ir".to_string()),
    };
    let abroad = IpInfo {
        ip: "203.0.113.5".to_string(),
        country_code: Some("de".to_string()),
    };
    let unresolved = IpInfo {
        ip: "127.0.0.1".to_string(),
        country_code: None,
    };

    assert!(home.is_home_region());
    assert!(!abroad.is_home_region());
    assert!(!unresolved.is_home_region());
}
