//! Persisted device settings
//!
//! All text fields are bounded; setters truncate on a char boundary rather
//! than fail. Settings are stored in flash as postcard-serialized binary
//! data and exchanged with the browser as JSON (see [`crate::api`]).

use heapless::String;
use railboard_protocol::{BoardKind, MAX_ROWS};
use serde::{Deserialize, Serialize};

use crate::board::BoardQuery;
use crate::clock::TimeOfDay;
use crate::scheduler::MIN_UPDATE_EVERY_S;

pub const SSID_LEN: usize = 32;
pub const PASSWORD_LEN: usize = 64;
pub const RAIL_TOKEN_LEN: usize = 39;
pub const TFL_TOKEN_LEN: usize = 71;
pub const WEATHER_TOKEN_LEN: usize = 55;
pub const CALLING_AT_LEN: usize = 127;
pub const TUBE_LINE_LEN: usize = 27;
pub const TUBE_DIR_LEN: usize = 15;

/// Station codes are exactly this many letters
pub const CRS_LEN: usize = 3;

/// Shortest ticker dwell in milliseconds
pub const MIN_TICKER_MS: u32 = 1000;

/// Upper bound on an encoded settings record
pub const SETTINGS_MAX_ENCODED: usize = 768;

/// Errors from validated setters and persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Station code is not three letters
    InvalidStation,
    /// Wi-Fi network name is empty
    EmptySsid,
    /// Record does not fit the buffer
    Encode,
    /// Stored record is malformed or from an older layout
    Decode,
}

/// Data source shown on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Rail,
    Tube,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Rail => "rail",
            Source::Tube => "tube",
        }
    }

    /// `tube` in any case selects the tube; anything else is rail
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("tube") {
            Source::Tube
        } else {
            Source::Rail
        }
    }
}

/// Credential kinds managed through the token endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenKind {
    /// Darwin OpenLDBWS access token
    Rail,
    Tfl,
    Weather,
}

/// Compile-time defaults, used on first boot and by factory reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    pub rail_token: &'static str,
    pub station: &'static str,
    pub mode: BoardKind,
    pub rows: u8,
    pub update_every_s: u16,
    pub ticker_ms: u32,
}

impl Defaults {
    /// Defaults with no credentials
    pub const FACTORY: Defaults = Defaults {
        wifi_ssid: "",
        wifi_password: "",
        rail_token: "",
        station: "WAT",
        mode: BoardKind::Departures,
        rows: 8,
        update_every_s: 30,
        ticker_ms: 7000,
    };
}

impl Default for Defaults {
    fn default() -> Self {
        Self::FACTORY
    }
}

/// Copy `s` into a bounded string, dropping whole chars past capacity
pub fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub wifi_ssid: String<SSID_LEN>,
    pub wifi_password: String<PASSWORD_LEN>,

    pub rail_token: String<RAIL_TOKEN_LEN>,
    pub tfl_token: String<TFL_TOKEN_LEN>,
    pub weather_token: String<WEATHER_TOKEN_LEN>,

    pub mode: BoardKind,
    /// Station CRS code, upper case
    pub station: String<CRS_LEN>,
    /// Rows requested and shown
    pub rows: u8,
    /// Ticker dwell in milliseconds
    ///
    /// Stored and editable only. The ribbon scrolls at the fixed
    /// [`FRAME_MS`](crate::ticker::FRAME_MS) period whatever this holds.
    pub ticker_ms: u32,

    pub source: Source,
    /// Comma-separated calling-point filter
    pub calling_at: String<CALLING_AT_LEN>,
    pub include_bus: bool,
    pub include_pass: bool,
    pub show_date: bool,
    pub include_weather: bool,
    pub auto_update: bool,
    /// Seconds between successful polls
    pub update_every_s: u16,
    /// Screensaver window
    pub screensaver_start: TimeOfDay,
    pub screensaver_end: TimeOfDay,
    pub tube_line: String<TUBE_LINE_LEN>,
    pub tube_direction: String<TUBE_DIR_LEN>,
}

impl Settings {
    pub fn from_defaults(defaults: &Defaults) -> Self {
        let mut settings = Self {
            wifi_ssid: bounded(defaults.wifi_ssid),
            wifi_password: bounded(defaults.wifi_password),
            rail_token: bounded(defaults.rail_token),
            tfl_token: String::new(),
            weather_token: String::new(),
            mode: defaults.mode,
            station: String::new(),
            rows: defaults.rows.clamp(1, MAX_ROWS),
            ticker_ms: defaults.ticker_ms.max(MIN_TICKER_MS),
            source: Source::Rail,
            calling_at: String::new(),
            include_bus: false,
            include_pass: true,
            show_date: true,
            include_weather: false,
            auto_update: true,
            update_every_s: defaults.update_every_s.max(MIN_UPDATE_EVERY_S),
            screensaver_start: TimeOfDay::from_seconds(23 * 3600),
            screensaver_end: TimeOfDay::from_seconds(6 * 3600),
            tube_line: String::new(),
            tube_direction: String::new(),
        };
        if settings.set_station(defaults.station).is_err() {
            settings.station = bounded(Defaults::FACTORY.station);
        }
        settings
    }

    /// Restore every field from `defaults`
    pub fn reset_to_defaults(&mut self, defaults: &Defaults) {
        *self = Self::from_defaults(defaults);
    }

    /// Store a three-letter station code, upper-cased
    pub fn set_station(&mut self, code: &str) -> Result<(), SettingsError> {
        let code = code.trim();
        if code.len() != CRS_LEN || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(SettingsError::InvalidStation);
        }
        self.station.clear();
        for b in code.bytes() {
            let _ = self.station.push(b.to_ascii_uppercase() as char);
        }
        Ok(())
    }

    /// `arrivals` in any case selects arrivals; anything else departures
    pub fn set_mode(&mut self, mode: &str) {
        self.mode = if mode.trim().eq_ignore_ascii_case("arrivals") {
            BoardKind::Arrivals
        } else {
            BoardKind::Departures
        };
    }

    pub fn set_source(&mut self, source: &str) {
        self.source = Source::from_setting(source);
    }

    pub fn set_rows(&mut self, rows: u8) {
        self.rows = rows.clamp(1, MAX_ROWS);
    }

    pub fn set_update_every(&mut self, seconds: u16) {
        self.update_every_s = seconds.max(MIN_UPDATE_EVERY_S);
    }

    pub fn set_ticker_ms(&mut self, ms: u32) {
        self.ticker_ms = ms.max(MIN_TICKER_MS);
    }

    /// Update either end of the screensaver window; malformed times are ignored
    pub fn set_screensaver(&mut self, start: Option<&str>, end: Option<&str>) {
        if let Some(t) = start.and_then(TimeOfDay::parse) {
            self.screensaver_start = t;
        }
        if let Some(t) = end.and_then(TimeOfDay::parse) {
            self.screensaver_end = t;
        }
    }

    pub fn set_calling_at(&mut self, list: &str) {
        self.calling_at = bounded(list);
    }

    pub fn set_tube_line(&mut self, line: &str) {
        self.tube_line = bounded(line);
    }

    pub fn set_tube_direction(&mut self, direction: &str) {
        self.tube_direction = bounded(direction);
    }

    /// Network credentials; the password may be empty for open networks
    pub fn set_wifi(&mut self, ssid: &str, password: &str) -> Result<(), SettingsError> {
        if ssid.is_empty() {
            return Err(SettingsError::EmptySsid);
        }
        self.wifi_ssid = bounded(ssid);
        self.wifi_password = bounded(password);
        Ok(())
    }

    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Rail => &self.rail_token,
            TokenKind::Tfl => &self.tfl_token,
            TokenKind::Weather => &self.weather_token,
        }
    }

    /// Store a token verbatim; an empty token clears it
    pub fn set_token(&mut self, kind: TokenKind, token: &str) {
        match kind {
            TokenKind::Rail => self.rail_token = bounded(token),
            TokenKind::Tfl => self.tfl_token = bounded(token),
            TokenKind::Weather => self.weather_token = bounded(token),
        }
    }

    /// Request parameters for the configured board
    pub fn board_query(&self) -> BoardQuery<'_> {
        BoardQuery {
            kind: self.mode,
            crs: &self.station,
            rows: self.rows,
            token: &self.rail_token,
        }
    }

    /// Serialize into `buf`, returning the used prefix
    pub fn encode<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], SettingsError> {
        postcard::to_slice(self, buf).map_err(|_| SettingsError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SettingsError> {
        postcard::from_bytes(bytes).map_err(|_| SettingsError::Decode)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_defaults(&Defaults::FACTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_defaults() {
        let s = Settings::default();
        assert_eq!(s.station, "WAT");
        assert_eq!(s.mode, BoardKind::Departures);
        assert_eq!(s.update_every_s, 30);
        assert_eq!(s.ticker_ms, 7000);
        assert_eq!(s.rows, 8);
        assert_eq!(s.screensaver_start.hhmm(), "23:00");
        assert_eq!(s.screensaver_end.hhmm(), "06:00");
        assert!(s.rail_token.is_empty());
        assert!(s.include_pass && s.show_date && s.auto_update);
    }

    #[test]
    fn test_station_validation() {
        let mut s = Settings::default();
        assert_eq!(s.set_station("eus"), Ok(()));
        assert_eq!(s.station, "EUS");
        assert_eq!(s.set_station("EUST"), Err(SettingsError::InvalidStation));
        assert_eq!(s.set_station("E1S"), Err(SettingsError::InvalidStation));
        assert_eq!(s.station, "EUS");
    }

    #[test]
    fn test_mode_and_source() {
        let mut s = Settings::default();
        s.set_mode("ARRIVALS");
        assert_eq!(s.mode, BoardKind::Arrivals);
        s.set_mode("anything");
        assert_eq!(s.mode, BoardKind::Departures);
        s.set_source("Tube");
        assert_eq!(s.source, Source::Tube);
        s.set_source("bus");
        assert_eq!(s.source, Source::Rail);
    }

    #[test]
    fn test_numeric_clamps() {
        let mut s = Settings::default();
        s.set_update_every(2);
        assert_eq!(s.update_every_s, 5);
        s.set_ticker_ms(10);
        assert_eq!(s.ticker_ms, 1000);
        s.set_rows(0);
        assert_eq!(s.rows, 1);
        s.set_rows(40);
        assert_eq!(s.rows, 16);
    }

    #[test]
    fn test_screensaver_ignores_malformed() {
        let mut s = Settings::default();
        s.set_screensaver(Some("22:30"), Some("7am"));
        assert_eq!(s.screensaver_start.hhmm(), "22:30");
        assert_eq!(s.screensaver_end.hhmm(), "06:00");
    }

    #[test]
    fn test_text_truncated_on_char_boundary() {
        let mut s = Settings::default();
        let long: alloc::string::String = core::iter::repeat('é').take(40).collect();
        s.set_tube_direction(&long);
        assert_eq!(s.tube_direction.chars().count(), TUBE_DIR_LEN / 2);
    }

    #[test]
    fn test_wifi_requires_ssid() {
        let mut s = Settings::default();
        assert_eq!(s.set_wifi("", "secret"), Err(SettingsError::EmptySsid));
        assert_eq!(s.set_wifi("home", ""), Ok(()));
        assert_eq!(s.wifi_ssid, "home");
    }

    #[test]
    fn test_tokens() {
        let mut s = Settings::default();
        s.set_token(TokenKind::Tfl, "abc");
        assert_eq!(s.token(TokenKind::Tfl), "abc");
        assert_eq!(s.token(TokenKind::Rail), "");
        s.set_token(TokenKind::Tfl, "");
        assert_eq!(s.token(TokenKind::Tfl), "");
    }

    #[test]
    fn test_postcard_round_trip() {
        let mut s = Settings::default();
        s.set_station("MAN").unwrap();
        s.set_mode("arrivals");
        s.set_calling_at("Stockport, Crewe");
        s.set_token(TokenKind::Rail, "0000-1111");

        let mut buf = [0u8; SETTINGS_MAX_ENCODED];
        let used = s.encode(&mut buf).unwrap().len();
        assert_eq!(Settings::decode(&buf[..used]), Ok(s));
        assert_eq!(Settings::decode(&buf[..used / 2]), Err(SettingsError::Decode));
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut s = Settings::default();
        s.set_station("MAN").unwrap();
        s.set_update_every(120);
        let defaults = Defaults {
            station: "kgx",
            ..Defaults::FACTORY
        };
        s.reset_to_defaults(&defaults);
        assert_eq!(s.station, "KGX");
        assert_eq!(s.update_every_s, 30);
    }
}
