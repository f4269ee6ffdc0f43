//! HTTPS transport over embassy-net
//!
//! One TLS connection per request; the service is asked to close it. The
//! whole exchange, DNS and handshake included, runs under the fetch
//! timeout. Certificates are not verified.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use defmt::*;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use esp_hal::rng::Rng;
use railboard_core::board::FETCH_TIMEOUT_MS;
use railboard_core::traits::{HttpRequest, HttpResponse, Transport, TransportError};
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::request::{Method, RequestBuilder};

/// TLS record buffers; the read side must hold a full 16KB record
const TLS_READ_LEN: usize = 16_640;
const TLS_WRITE_LEN: usize = 4096;

/// Response headers plus body
const RESPONSE_LEN: usize = 48 * 1024;

/// Socket buffers of the single TCP connection
pub const TCP_BUFFER_LEN: usize = 1024;

pub type TcpState = TcpClientState<1, TCP_BUFFER_LEN, TCP_BUFFER_LEN>;

/// Secured POST client
pub struct HttpsTransport {
    stack: Stack<'static>,
    tcp_state: &'static TcpState,
    rng: Rng,
    tls_read: Vec<u8>,
    tls_write: Vec<u8>,
    response: Vec<u8>,
}

impl HttpsTransport {
    pub fn new(stack: Stack<'static>, tcp_state: &'static TcpState, rng: Rng) -> Self {
        Self {
            stack,
            tcp_state,
            rng,
            tls_read: vec![0u8; TLS_READ_LEN],
            tls_write: vec![0u8; TLS_WRITE_LEN],
            response: vec![0u8; RESPONSE_LEN],
        }
    }

    async fn exchange(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        let Self {
            stack,
            tcp_state,
            rng,
            tls_read,
            tls_write,
            response,
        } = self;

        if !stack.is_config_up() {
            debug!("Network not up, skipping request");
            return Err(TransportError::Connect);
        }

        let seed = (rng.random() as u64) << 32 | rng.random() as u64;
        let tcp = TcpClient::new(*stack, *tcp_state);
        let dns = DnsSocket::new(*stack);
        let tls = TlsConfig::new(seed, tls_read, tls_write, TlsVerify::None);
        let mut client = HttpClient::new_with_tls(&tcp, &dns, tls);

        let handle = client.request(Method::POST, request.url).await.map_err(|e| {
            warn!("Connect to {} failed: {:?}", request.url, e);
            TransportError::Connect
        })?;
        let mut handle = handle.headers(request.headers).body(request.body);

        let reply = handle.send(response).await.map_err(|e| {
            warn!("Request failed: {:?}", e);
            io_error(e)
        })?;
        let status = reply.status.0;

        let body = reply.body().read_to_end().await.map_err(|e| {
            warn!("Reading response body failed: {:?}", e);
            io_error(e)
        })?;
        debug!("HTTP {} with {} body bytes", status, body.len());

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }
}

fn io_error(e: reqwless::Error) -> TransportError {
    match e {
        reqwless::Error::BufferTooSmall => TransportError::BodyTooLarge,
        _ => TransportError::Io,
    }
}

impl Transport for HttpsTransport {
    async fn post(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        match with_timeout(Duration::from_millis(FETCH_TIMEOUT_MS), self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Request timed out after {}ms", FETCH_TIMEOUT_MS);
                Err(TransportError::Timeout)
            }
        }
    }
}
