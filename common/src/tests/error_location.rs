// Unit tests for ErrorLocation capture and formatting

use crate::ErrorLocation;
use std::panic::Location;

#[test]
fn given_caller_location_when_converted_then_captures_this_file() {
    let location = ErrorLocation::from(Location::caller());
    assert!(location.file.ends_with("error_location.rs"));
    assert!(location.line > 0);
}

#[test]
fn given_location_when_displayed_then_formats_as_bracketed_triple() {
    let location = ErrorLocation {
        file: "src/lib.rs",
        line: 42,
        column: 7,
    };
    assert_eq!(format!("{location}"), "[src/lib.rs:42:7]");
}
