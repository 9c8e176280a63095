mod channel;
mod connection;
mod notify;
