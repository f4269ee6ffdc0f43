//! Browser control surface
//!
//! [`handle`] maps one request to a response and the side effects the
//! caller must carry out afterwards: persisting settings and scheduling a
//! reboot. It never touches flash or the network itself.

pub mod json;
pub mod request;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::config::{Defaults, Settings, TokenKind};
use json::{to_body, ErrorView, SettingsPatch, SettingsView, StatusView, TokenBody, VersionView};
pub use request::{parse_head, Method, RequestError, RequestHead, MAX_BODY_LEN, MAX_HEAD_LEN};

/// Delay before rebooting after saving settings
pub const SETTINGS_REBOOT_MS: u64 = 1200;

/// Delay before rebooting on request
pub const REBOOT_MS: u64 = 200;

pub const JSON: &str = "application/json";
pub const TEXT: &str = "text/plain";

/// A response plus the follow-up work it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Settings changed and must be written to flash
    pub persist: bool,
    /// Restart the device this long after the response is sent
    pub reboot_after_ms: Option<u64>,
}

impl ApiResponse {
    fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: JSON,
            body,
            persist: false,
            reboot_after_ms: None,
        }
    }

    fn ok<T: serde::Serialize>(value: &T) -> Self {
        Self::json(200, to_body(value))
    }

    fn bad_json() -> Self {
        Self::json(400, to_body(&ErrorView { err: "bad json" }))
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: TEXT,
            body: b"Not found".to_vec(),
            persist: false,
            reboot_after_ms: None,
        }
    }

    fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }

    fn reboot_after(mut self, ms: u64) -> Self {
        self.reboot_after_ms = Some(ms);
        self
    }

    /// Answer to a request whose head could not be accepted
    pub fn rejected(error: RequestError) -> Self {
        let (status, body): (u16, &[u8]) = match error {
            RequestError::Malformed => (400, b"Bad request"),
            RequestError::TooLarge => (413, b"Request too large"),
        };
        Self {
            status,
            content_type: TEXT,
            body: body.to_vec(),
            persist: false,
            reboot_after_ms: None,
        }
    }

    /// Reason phrase for the status line
    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            413 => "Payload Too Large",
            _ => "Error",
        }
    }

    /// Status line and headers, ending with the blank line
    pub fn head(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        )
    }
}

fn token_route(path: &str) -> Option<TokenKind> {
    match path {
        "/api/rail/token" | "/api/token" => Some(TokenKind::Rail),
        "/api/tfl/token" => Some(TokenKind::Tfl),
        "/api/weather/token" => Some(TokenKind::Weather),
        _ => None,
    }
}

/// Handle one request against the live settings
pub fn handle(
    method: Method,
    path: &str,
    body: &[u8],
    settings: &mut Settings,
    defaults: &Defaults,
) -> ApiResponse {
    if let Some(kind) = token_route(path) {
        return handle_token(method, path, body, kind, settings);
    }

    match (method, path) {
        (Method::Get, "/api/settings") => ApiResponse::ok(&SettingsView::from(&*settings)),
        (Method::Post, "/api/settings") => match serde_json::from_slice::<SettingsPatch>(body) {
            Ok(patch) => {
                patch.apply(settings);
                ApiResponse::ok(&SettingsView::from(&*settings))
                    .persisted()
                    .reboot_after(SETTINGS_REBOOT_MS)
            }
            Err(_) => ApiResponse::bad_json(),
        },
        (Method::Get, "/api/version") => ApiResponse::ok(&VersionView {
            version: json::VERSION_NAME,
            build: json::BUILD,
        }),
        (Method::Post, "/api/factory-reset") => {
            settings.reset_to_defaults(defaults);
            ApiResponse::ok(&StatusView { status: "ok" }).persisted()
        }
        (Method::Post, "/api/firmware/check") => ApiResponse::ok(&StatusView { status: "noop" }),
        (Method::Post, "/api/reset-wifi") => ApiResponse::ok(&StatusView { status: "queued" }),
        (Method::Post, "/reboot") => {
            ApiResponse::ok(&StatusView { status: "rebooting" }).reboot_after(REBOOT_MS)
        }
        _ => ApiResponse::not_found(),
    }
}

fn handle_token(
    method: Method,
    path: &str,
    body: &[u8],
    kind: TokenKind,
    settings: &mut Settings,
) -> ApiResponse {
    match method {
        Method::Get => ApiResponse::ok(&TokenBody::of(settings, kind)),
        Method::Post => match serde_json::from_slice::<TokenBody>(body) {
            Ok(update) => {
                settings.set_token(kind, update.token.trim());
                ApiResponse::ok(&TokenBody::of(settings, kind)).persisted()
            }
            Err(_) => ApiResponse::bad_json(),
        },
        // The legacy alias is read/write only
        Method::Delete if path != "/api/token" => {
            settings.set_token(kind, "");
            ApiResponse::ok(&TokenBody::of(settings, kind)).persisted()
        }
        _ => ApiResponse::not_found(),
    }
}
