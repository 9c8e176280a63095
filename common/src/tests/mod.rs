mod connection;
mod error_location;
mod settings;
