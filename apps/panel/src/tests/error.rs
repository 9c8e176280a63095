// Unit tests for error module

use crate::error::PanelError;

use common::ErrorLocation;

use std::panic::Location;

#[test]
fn given_panel_error_when_displayed_then_message_and_location_present() {
    let err = PanelError::Panel {
        message: String::from("Test"),
        location: ErrorLocation::from(Location::caller()),
    };

    let rendered = err.to_string();
    assert!(rendered.contains("Panel Error"));
    assert!(rendered.contains("Test"));
    assert!(
        rendered.contains("error.rs"),
        "Display should carry the capture site"
    );
}

#[test]
fn given_core_error_when_displayed_then_variant_is_distinguishable() {
    let err = PanelError::Core {
        message: String::from("channel closed"),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().starts_with("Core Error"));
}
