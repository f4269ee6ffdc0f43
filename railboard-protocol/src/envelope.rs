//! Darwin OpenLDBWS request envelope
//!
//! The request is a fixed-shape SOAP 1.2 document. Only the board kind,
//! station code, row count, look-ahead window and access token vary.

use core::fmt::Write;
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Service host
pub const DARWIN_HOST: &str = "lite.realtime.nationalrail.co.uk";

/// Service path on [`DARWIN_HOST`]
pub const DARWIN_PATH: &str = "/OpenLDBWS/ldb9.asmx";

/// Full endpoint URL
pub const DARWIN_URL: &str = "https://lite.realtime.nationalrail.co.uk/OpenLDBWS/ldb9.asmx";

/// SOAP 1.2 envelope namespace
pub const SOAP12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// LDB operations namespace, also the SOAP action prefix
pub const LDB_NS: &str = "http://thalesgroup.com/RTTI/2016-02-16/ldb/";

/// Access token types namespace
pub const TOKEN_NS: &str = "http://thalesgroup.com/RTTI/2013-11-28/Token/types";

/// Look-ahead window requested from the service, in minutes
pub const TIME_WINDOW_MINS: u16 = 120;

/// Upper bound on the number of rows the service will return
pub const MAX_ROWS: u8 = 16;

/// Encoded envelope capacity in bytes
pub const ENVELOPE_CAPACITY: usize = 1024;

/// Content-Type header capacity in bytes
pub const CONTENT_TYPE_CAPACITY: usize = 128;

/// Which board the device shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BoardKind {
    /// Services leaving the station
    #[default]
    Departures,
    /// Services arriving at the station
    Arrivals,
}

impl BoardKind {
    /// SOAP operation name
    pub fn method(self) -> &'static str {
        match self {
            BoardKind::Departures => "GetDepartureBoard",
            BoardKind::Arrivals => "GetArrivalBoard",
        }
    }

    /// Body element wrapping the request parameters
    pub fn request_tag(self) -> &'static str {
        match self {
            BoardKind::Departures => "GetDepartureBoardRequest",
            BoardKind::Arrivals => "GetArrivalBoardRequest",
        }
    }

    /// Scheduled time element of a service
    pub fn time_field(self) -> &'static str {
        match self {
            BoardKind::Departures => "std",
            BoardKind::Arrivals => "sta",
        }
    }

    /// Estimated time element of a service
    pub fn estimate_field(self) -> &'static str {
        match self {
            BoardKind::Departures => "etd",
            BoardKind::Arrivals => "eta",
        }
    }

    /// Element naming the far end of the journey
    pub fn endpoint_field(self) -> &'static str {
        match self {
            BoardKind::Departures => "destination",
            BoardKind::Arrivals => "origin",
        }
    }

    /// Title suffix shown in the header
    pub fn label(self) -> &'static str {
        match self {
            BoardKind::Departures => "Departures",
            BoardKind::Arrivals => "Arrivals",
        }
    }

    /// Settings value
    pub fn as_str(self) -> &'static str {
        match self {
            BoardKind::Departures => "departures",
            BoardKind::Arrivals => "arrivals",
        }
    }

    /// Parse a settings value; anything starting with `a` is arrivals
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().bytes().next().map(|b| b.to_ascii_lowercase()) {
            Some(b'a') => Some(BoardKind::Arrivals),
            Some(b'd') => Some(BoardKind::Departures),
            _ => None,
        }
    }
}

/// Errors building a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnvelopeError {
    /// Encoded request does not fit the output buffer
    TooLong,
}

impl From<core::fmt::Error> for EnvelopeError {
    fn from(_: core::fmt::Error) -> Self {
        EnvelopeError::TooLong
    }
}

/// Parameters of one board request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRequest<'a> {
    pub kind: BoardKind,
    /// Three-letter station code
    pub crs: &'a str,
    /// Requested row count, capped at [`MAX_ROWS`]
    pub rows: u8,
    /// Access token, placed in the header verbatim
    pub token: &'a str,
}

impl<'a> BoardRequest<'a> {
    /// Create a request with the fixed look-ahead window
    pub fn new(kind: BoardKind, crs: &'a str, rows: u8, token: &'a str) -> Self {
        Self {
            kind,
            crs,
            rows: rows.min(MAX_ROWS),
            token,
        }
    }

    /// Write the SOAP envelope into `out`
    pub fn write_envelope<W: Write>(&self, out: &mut W) -> Result<(), EnvelopeError> {
        let tag = self.kind.request_tag();
        write!(
            out,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <soap:Envelope xmlns:soap=\"{SOAP12_NS}\" xmlns:typ=\"{TOKEN_NS}\" xmlns:ldb=\"{LDB_NS}\">\
             <soap:Header><typ:AccessToken><typ:TokenValue>{}</typ:TokenValue></typ:AccessToken></soap:Header>\
             <soap:Body><ldb:{tag}>\
             <ldb:numRows>{}</ldb:numRows>\
             <ldb:crs>{}</ldb:crs>\
             <ldb:timeOffset>0</ldb:timeOffset>\
             <ldb:timeWindow>{TIME_WINDOW_MINS}</ldb:timeWindow>\
             </ldb:{tag}></soap:Body></soap:Envelope>",
            self.token, self.rows, self.crs,
        )?;
        Ok(())
    }

    /// Encode the SOAP envelope into a fixed-capacity string
    pub fn envelope(&self) -> Result<String<ENVELOPE_CAPACITY>, EnvelopeError> {
        let mut out = String::new();
        self.write_envelope(&mut out)?;
        Ok(out)
    }

    /// Content-Type header value carrying the SOAP action
    pub fn content_type(&self) -> Result<String<CONTENT_TYPE_CAPACITY>, EnvelopeError> {
        let mut out = String::new();
        write!(
            out,
            "application/soap+xml; charset=utf-8; action=\"{LDB_NS}{}\"",
            self.kind.method()
        )?;
        Ok(out)
    }
}

/// Accept header value
pub const ACCEPT: &str = "text/xml";

/// Connection header value; every request uses a fresh connection
pub const CONNECTION: &str = "close";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::find_first;

    #[test]
    fn test_departure_envelope_fields() {
        let req = BoardRequest::new(BoardKind::Departures, "EUS", 8, "tok-123");
        let env = req.envelope().unwrap();

        assert!(env.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert_eq!(find_first(&env, "TokenValue", 0), Some("tok-123"));
        assert_eq!(find_first(&env, "numRows", 0), Some("8"));
        assert_eq!(find_first(&env, "crs", 0), Some("EUS"));
        assert_eq!(find_first(&env, "timeOffset", 0), Some("0"));
        assert_eq!(find_first(&env, "timeWindow", 0), Some("120"));
        assert!(find_first(&env, "GetDepartureBoardRequest", 0).is_some());
        assert!(find_first(&env, "GetArrivalBoardRequest", 0).is_none());
    }

    #[test]
    fn test_arrival_envelope_uses_arrival_tag() {
        let req = BoardRequest::new(BoardKind::Arrivals, "MAN", 4, "t");
        let env = req.envelope().unwrap();
        assert!(env.contains("<ldb:GetArrivalBoardRequest>"));
        assert!(env.contains("</ldb:GetArrivalBoardRequest>"));
    }

    #[test]
    fn test_rows_are_capped() {
        let req = BoardRequest::new(BoardKind::Departures, "EUS", 40, "t");
        assert_eq!(req.rows, MAX_ROWS);
    }

    #[test]
    fn test_content_type_action() {
        let req = BoardRequest::new(BoardKind::Arrivals, "EUS", 8, "t");
        assert_eq!(
            req.content_type().unwrap().as_str(),
            "application/soap+xml; charset=utf-8; action=\"http://thalesgroup.com/RTTI/2016-02-16/ldb/GetArrivalBoard\""
        );
    }

    #[test]
    fn test_oversized_token_rejected() {
        let token = [b'x'; ENVELOPE_CAPACITY];
        let token = core::str::from_utf8(&token).unwrap();
        let req = BoardRequest::new(BoardKind::Departures, "EUS", 8, token);
        assert_eq!(req.envelope(), Err(EnvelopeError::TooLong));
    }

    #[test]
    fn test_kind_from_setting() {
        assert_eq!(BoardKind::from_setting("arrivals"), Some(BoardKind::Arrivals));
        assert_eq!(BoardKind::from_setting(" Departures"), Some(BoardKind::Departures));
        assert_eq!(BoardKind::from_setting("x"), None);
        assert_eq!(BoardKind::from_setting(""), None);
    }

    #[test]
    fn test_kind_fields() {
        assert_eq!(BoardKind::Departures.time_field(), "std");
        assert_eq!(BoardKind::Arrivals.estimate_field(), "eta");
        assert_eq!(BoardKind::Arrivals.endpoint_field(), "origin");
        assert_eq!(BoardKind::Departures.label(), "Departures");
    }
}
