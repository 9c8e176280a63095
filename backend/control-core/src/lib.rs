pub mod advisor;
pub mod channel;
pub mod connection;
pub mod connectivity;
pub mod error;
pub mod location;
pub mod notify;
pub mod settings;

#[cfg(test)]
mod tests;

pub const IP_LOOKUP_HOSTNAME: &str = "api.ipify.org";
pub const IP_LOOKUP_URL: &str =
    const_format::concatcp!("https://", IP_LOOKUP_HOSTNAME, "/?format=json");

pub const GEO_LOOKUP_HOSTNAME: &str = "api.iplocation.net";
pub const GEO_LOOKUP_URL: &str = const_format::concatcp!("https://", GEO_LOOKUP_HOSTNAME, "/");
