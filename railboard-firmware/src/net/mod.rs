//! Network side: HTTPS client for the board service

pub mod transport;

pub use transport::HttpsTransport;
