//! Browser control server
//!
//! One connection at a time on port 80. Each request is read in full,
//! handed to `railboard_core::api::handle`, answered, and closed. Settings
//! changes are written to flash before the response goes out.

use alloc::vec;

use defmt::*;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::Duration;
use embedded_io_async::Write;
use railboard_core::api::{self, parse_head, ApiResponse, MAX_BODY_LEN, MAX_HEAD_LEN};

use crate::channels::{SharedSettings, SharedStore, REBOOT};
use crate::config::{SettingsPersistence, DEFAULTS};

const PORT: u16 = 80;

/// Socket buffer size in each direction
const SOCKET_BUFFER_LEN: usize = 1536;

/// Idle time before a half-sent request is dropped
const SOCKET_TIMEOUT_S: u64 = 10;

/// Errors that end a connection without an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ServeError {
    /// Peer went away before the request was complete
    Closed,
    /// Socket read or write failed
    Io,
}

impl From<embassy_net::tcp::Error> for ServeError {
    fn from(_: embassy_net::tcp::Error) -> Self {
        ServeError::Io
    }
}

#[embassy_executor::task]
pub async fn http_task(
    stack: Stack<'static>,
    settings: &'static SharedSettings,
    store: &'static SharedStore,
) {
    info!("Control server task started");

    let mut rx_buffer = [0u8; SOCKET_BUFFER_LEN];
    let mut tx_buffer = [0u8; SOCKET_BUFFER_LEN];
    let mut request = vec![0u8; MAX_HEAD_LEN + MAX_BODY_LEN];

    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!(
            "Control server on {} port {}",
            Debug2Format(&config.address),
            PORT
        );
    }

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_S)));

        if let Err(e) = socket.accept(PORT).await {
            warn!("Accept failed: {:?}", e);
            continue;
        }

        if let Err(e) = serve(&mut socket, &mut request, settings, store).await {
            debug!("Connection dropped: {:?}", e);
        }

        socket.close();
        let _ = socket.flush().await;
    }
}

/// Read one request, answer it, and queue any follow-up
async fn serve(
    socket: &mut TcpSocket<'_>,
    buf: &mut [u8],
    settings: &SharedSettings,
    store: &SharedStore,
) -> Result<(), ServeError> {
    let mut filled = 0;

    // Head first, then as much body as it declares
    let wanted = loop {
        match parse_head(&buf[..filled]) {
            Ok(Some(head)) => break head.head_len + head.content_length,
            Ok(None) => {}
            Err(e) => {
                warn!("Rejected request: {:?}", e);
                return respond(socket, &ApiResponse::rejected(e)).await;
            }
        }
        filled += read_some(socket, &mut buf[filled..MAX_HEAD_LEN]).await?;
    };
    while filled < wanted {
        filled += read_some(socket, &mut buf[filled..wanted]).await?;
    }

    let response = match parse_head(&buf[..filled]) {
        Ok(Some(head)) => {
            let body = &buf[head.head_len..wanted];
            debug!("{} {}", head.method, head.path);

            let mut live = settings.lock().await;
            let response = api::handle(head.method, head.path, body, &mut live, &DEFAULTS);
            if response.persist {
                let mut flash = store.lock().await;
                if let Err(e) = SettingsPersistence::new(&mut flash).save(&live).await {
                    error!("Saving settings failed: {:?}", e);
                }
            }
            response
        }
        Ok(None) => return Err(ServeError::Closed),
        Err(e) => ApiResponse::rejected(e),
    };

    respond(socket, &response).await?;

    if let Some(delay_ms) = response.reboot_after_ms {
        REBOOT.signal(delay_ms);
    }
    Ok(())
}

async fn read_some(socket: &mut TcpSocket<'_>, into: &mut [u8]) -> Result<usize, ServeError> {
    match socket.read(into).await? {
        0 => Err(ServeError::Closed),
        n => Ok(n),
    }
}

async fn respond(socket: &mut TcpSocket<'_>, response: &ApiResponse) -> Result<(), ServeError> {
    socket.write_all(response.head().as_bytes()).await?;
    socket.write_all(&response.body).await?;
    socket.flush().await?;
    Ok(())
}
