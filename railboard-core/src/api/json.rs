//! JSON shapes of the control surface
//!
//! The settings object is flat apart from `wifi`. Incoming patches are
//! partial: absent keys leave the setting alone and unknown keys are
//! ignored.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::config::{Settings, TokenKind};

/// Reported by `GET /api/version`
pub const VERSION_NAME: &str = "RAILBOARD";
pub const BUILD: u32 = 1;

#[derive(Debug, Serialize)]
pub struct WifiView<'a> {
    pub ssid: &'a str,
}

/// `GET /api/settings` body; the Wi-Fi password is never echoed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView<'a> {
    pub source: &'a str,
    pub station: &'a str,
    pub nr_board_type: &'a str,
    pub calling_at: &'a str,
    pub include_bus: bool,
    pub include_pass: bool,
    pub show_date: bool,
    pub include_weather: bool,
    pub auto_update: bool,
    pub update_every: u16,
    pub ss_start: heapless::String<5>,
    pub ss_end: heapless::String<5>,
    pub line: &'a str,
    pub direction: &'a str,
    pub wifi: WifiView<'a>,
}

impl<'a> From<&'a Settings> for SettingsView<'a> {
    fn from(s: &'a Settings) -> Self {
        Self {
            source: s.source.as_str(),
            station: &s.station,
            nr_board_type: s.mode.as_str(),
            calling_at: &s.calling_at,
            include_bus: s.include_bus,
            include_pass: s.include_pass,
            show_date: s.show_date,
            include_weather: s.include_weather,
            auto_update: s.auto_update,
            update_every: s.update_every_s,
            ss_start: s.screensaver_start.hhmm(),
            ss_end: s.screensaver_end.hhmm(),
            line: &s.tube_line,
            direction: &s.tube_direction,
            wifi: WifiView { ssid: &s.wifi_ssid },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WifiPatch {
    pub ssid: Option<String>,
    pub pass: Option<String>,
}

/// `POST /api/settings` body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub source: Option<String>,
    pub station: Option<String>,
    pub nr_board_type: Option<String>,
    pub calling_at: Option<String>,
    pub include_bus: Option<bool>,
    pub include_pass: Option<bool>,
    pub show_date: Option<bool>,
    pub include_weather: Option<bool>,
    pub auto_update: Option<bool>,
    pub update_every: Option<u32>,
    pub ticker_ms: Option<u32>,
    pub rows: Option<u32>,
    pub ss_start: Option<String>,
    pub ss_end: Option<String>,
    pub line: Option<String>,
    pub direction: Option<String>,
    pub wifi: Option<WifiPatch>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SettingsPatch {
    /// Apply every recognised key through the validated setters
    ///
    /// A station code that is not three letters is skipped, as is an
    /// empty source or board type.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(source) = non_empty(&self.source) {
            settings.set_source(source);
        }
        if let Some(station) = non_empty(&self.station) {
            let _ = settings.set_station(station);
        }
        if let Some(mode) = non_empty(&self.nr_board_type) {
            settings.set_mode(mode);
        }
        if let Some(list) = &self.calling_at {
            settings.set_calling_at(list);
        }

        let flags = [
            (self.include_bus, &mut settings.include_bus),
            (self.include_pass, &mut settings.include_pass),
            (self.show_date, &mut settings.show_date),
            (self.include_weather, &mut settings.include_weather),
            (self.auto_update, &mut settings.auto_update),
        ];
        for (value, slot) in flags {
            if let Some(v) = value {
                *slot = v;
            }
        }

        if let Some(seconds) = self.update_every {
            settings.set_update_every(seconds.min(u16::MAX as u32) as u16);
        }
        if let Some(ms) = self.ticker_ms {
            settings.set_ticker_ms(ms);
        }
        if let Some(rows) = self.rows {
            settings.set_rows(rows.min(u8::MAX as u32) as u8);
        }
        settings.set_screensaver(self.ss_start.as_deref(), self.ss_end.as_deref());

        if let Some(line) = &self.line {
            settings.set_tube_line(line);
        }
        if let Some(direction) = &self.direction {
            settings.set_tube_direction(direction);
        }
        if let Some(wifi) = &self.wifi {
            if let Some(ssid) = non_empty(&wifi.ssid) {
                let _ = settings.set_wifi(ssid, wifi.pass.as_deref().unwrap_or(""));
            }
        }
    }
}

/// Token endpoint body in both directions
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    pub token: String,
}

impl TokenBody {
    pub fn of(settings: &Settings, kind: TokenKind) -> Self {
        Self {
            token: settings.token(kind).into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionView {
    pub version: &'static str,
    pub build: u32,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub err: &'static str,
}

/// Serialize `value`, falling back to an empty object
pub fn to_body<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec())
}
