//! HTTP transport trait
//!
//! The fetch pipeline needs exactly one operation: a POST with custom
//! headers that yields a status code and a body.

use alloc::string::String;

/// Errors from the network round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Could not resolve or connect to the host
    Connect,
    /// Connect or response exceeded the round-trip timeout
    Timeout,
    /// Connection dropped or TLS failure mid-exchange
    Io,
    /// Response body exceeded the receive buffer
    BodyTooLarge,
}

/// An outbound POST
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    /// Absolute `https://` URL
    pub url: &'a str,
    /// Header name/value pairs, sent in order
    pub headers: &'a [(&'a str, &'a str)],
    pub body: &'a [u8],
}

/// A completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Secured HTTP client
pub trait Transport {
    /// Perform one POST with a bounded connect/response timeout
    fn post(
        &mut self,
        request: &HttpRequest<'_>,
    ) -> impl core::future::Future<Output = Result<HttpResponse, TransportError>>;
}
