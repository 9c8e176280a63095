use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LocationError {
    #[error("Endpoint Error: {message} {location}")]
    Endpoint {
        message: String,
        location: ErrorLocation,
    },

    #[error("Request Error: {message} {location}")]
    Request {
        message: String,
        location: ErrorLocation,
    },

    #[error("Status Error: {message} {location}")]
    Status {
        message: String,
        location: ErrorLocation,
    },
}

impl From<url::ParseError> for LocationError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        LocationError::Endpoint {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for LocationError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        LocationError::Request {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
