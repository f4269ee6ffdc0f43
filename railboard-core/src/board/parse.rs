//! Board extraction from a Darwin response body
//!
//! Every field is optional. A missing element falls back to a per-field
//! default and never stops the rest of the response from being read.

use alloc::string::String;
use alloc::vec::Vec;

use railboard_protocol::scan::{elements, find_first};
use railboard_protocol::BoardKind;

use super::model::{BoardSnapshot, ServiceRow, Services};
use crate::clock::TimeOfDay;
use crate::text::{
    collapse_spaces, contains_ignore_case, html_decode, keep_first_sentence, strip_tags,
};

/// Estimate shown when the service gives none
pub const DEFAULT_ESTIMATE: &str = "On time";

/// Long operator names and their board display names
const OPERATOR_NAMES: [(&str, &str); 6] = [
    ("London North Eastern Railway", "LNER"),
    ("London Northwestern Railway", "London Northwestern"),
    ("Great Western Railway", "Great Western"),
    ("West Midlands Trains", "West Midlands"),
    ("South Western Railway", "South Western"),
    ("East Midlands Railway", "East Midlands"),
];

/// Shorten well-known operator names; others are trimmed only
pub fn normalize_operator(name: &str) -> &str {
    let name = name.trim();
    OPERATOR_NAMES
        .iter()
        .find(|(long, _)| *long == name)
        .map(|(_, short)| *short)
        .unwrap_or(name)
}

/// Raw fields consulted when deciding whether a service is a bus
#[derive(Debug, Clone, Copy, Default)]
pub struct BusHints<'a> {
    pub service_type: &'a str,
    pub is_bus: &'a str,
    pub category: &'a str,
    pub platform: &'a str,
    pub operator: &'a str,
}

/// Bus classification, checked in a fixed order
pub fn is_bus_service(hints: &BusHints<'_>) -> bool {
    let platform = hints.platform.trim();
    let operator = hints.operator.trim();

    if contains_ignore_case(hints.service_type, "bus") {
        return true;
    }
    if hints.is_bus.eq_ignore_ascii_case("true") || hints.is_bus == "1" {
        return true;
    }
    if contains_ignore_case(hints.category, "bus") {
        return true;
    }
    if platform.eq_ignore_ascii_case("bus") || platform.eq_ignore_ascii_case("coach") {
        return true;
    }
    ["replacement", "bus", "coach"]
        .iter()
        .any(|word| contains_ignore_case(operator, word))
}

fn field(buf: &str, name: &str) -> String {
    find_first(buf, name, 0).unwrap_or("").into()
}

fn decoded(buf: &str, name: &str) -> String {
    let mut value = field(buf, name);
    html_decode(&mut value);
    value
}

/// Extract one service; `None` when it has neither time nor place
pub fn parse_service(svc: &str, kind: BoardKind) -> Option<ServiceRow> {
    let time = field(svc, kind.time_field());

    let mut estimate = field(svc, kind.estimate_field());
    if estimate.is_empty() {
        estimate = DEFAULT_ESTIMATE.into();
    }
    html_decode(&mut estimate);

    let mut platform = decoded(svc, "platform");

    let mut operator = String::from(normalize_operator(find_first(svc, "operator", 0).unwrap_or("")));
    html_decode(&mut operator);

    let mut place: String = find_first(svc, kind.endpoint_field(), 0)
        .and_then(|end| find_first(end, "location", 0))
        .and_then(|loc| find_first(loc, "locationName", 0))
        .unwrap_or("")
        .into();
    html_decode(&mut place);

    let is_bus = is_bus_service(&BusHints {
        service_type: find_first(svc, "serviceType", 0).unwrap_or(""),
        is_bus: find_first(svc, "isBus", 0).unwrap_or(""),
        category: find_first(svc, "category", 0).unwrap_or(""),
        platform: &platform,
        operator: &operator,
    });
    if is_bus {
        platform.clear();
    }

    if time.is_empty() && place.is_empty() {
        return None;
    }

    Some(ServiceRow {
        time,
        place,
        estimate,
        platform,
        operator,
        is_bus,
    })
}

/// Reduce a raw advisory to plain first-sentence text
pub fn clean_advisory(raw: &str) -> String {
    let mut text = String::from(raw);
    html_decode(&mut text);
    strip_tags(&mut text);
    collapse_spaces(&mut text);
    keep_first_sentence(text.trim()).into()
}

/// Advisory messages in feed order, empties dropped
pub fn parse_advisories(body: &str) -> Vec<String> {
    let Some(messages) = find_first(body, "nrccMessages", 0) else {
        return Vec::new();
    };
    elements(messages, "message")
        .map(|inner| clean_advisory(find_first(inner, "text", 0).filter(|t| !t.is_empty()).unwrap_or(inner)))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Build a complete snapshot from a successful response
///
/// `crs` is the title fallback; at most `max_rows` services are kept.
pub fn parse_board(body: &str, kind: BoardKind, crs: &str, max_rows: usize) -> BoardSnapshot {
    let mut title = decoded(body, "locationName");
    if title.is_empty() {
        title = crs.into();
    }

    let mut services = Services::new();
    let max_rows = max_rows.min(services.capacity());
    if let Some(train_services) = find_first(body, "trainServices", 0) {
        for svc in elements(train_services, "service") {
            if services.len() >= max_rows {
                break;
            }
            if let Some(row) = parse_service(svc, kind) {
                let _ = services.push(row);
            }
        }
    }

    BoardSnapshot {
        title,
        services,
        advisories: parse_advisories(body),
        generated_at: find_first(body, "generatedAt", 0).and_then(TimeOfDay::from_timestamp),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const EUSTON_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
<soap:Body><GetDepartureBoardResponse xmlns="http://thalesgroup.com/RTTI/2016-02-16/ldb/">
<GetStationBoardResult xmlns:lt4="http://thalesgroup.com/RTTI/2015-11-27/ldb/types" xmlns:lt5="http://thalesgroup.com/RTTI/2016-02-16/ldb/types">
<lt4:generatedAt>2025-03-01T10:01:42.5+00:00</lt4:generatedAt>
<lt4:locationName>Euston</lt4:locationName>
<lt4:crs>EUS</lt4:crs>
<lt4:nrccMessages>
<lt:message>Delays expected &amp; some cancellations. Please check before you travel.</lt:message>
<lt:message><lt:text>&lt;P&gt;Lifts out of order&lt;/P&gt;</lt:text></lt:message>
<lt:message>   </lt:message>
</lt4:nrccMessages>
<lt5:trainServices>
<lt5:service>
<lt4:std>10:05</lt4:std><lt4:etd>On time</lt4:etd><lt4:platform>3</lt4:platform>
<lt4:operator>London North Eastern Railway</lt4:operator>
<lt5:destination><lt4:location><lt4:locationName>Edinburgh</lt4:locationName><lt4:crs>EDB</lt4:crs></lt4:location></lt5:destination>
</lt5:service>
<lt5:service>
<lt4:std>10:12</lt4:std><lt4:etd>10:20</lt4:etd><lt4:platform>12</lt4:platform>
<lt4:operator>West Midlands Trains</lt4:operator>
<lt5:destination><lt4:location><lt4:locationName>Birmingham New Street</lt4:locationName></lt4:location><lt4:location><lt4:locationName>Crewe</lt4:locationName></lt4:location></lt5:destination>
</lt5:service>
<lt5:service>
<lt4:std>10:30</lt4:std><lt4:platform>BUS</lt4:platform>
<lt4:operator>Avanti West Coast</lt4:operator><lt4:serviceType>bus</lt4:serviceType>
<lt5:destination><lt4:location><lt4:locationName>Milton Keynes &amp; Bletchley</lt4:locationName></lt4:location></lt5:destination>
</lt5:service>
<lt5:service><lt4:etd>Cancelled</lt4:etd></lt5:service>
</lt5:trainServices>
</GetStationBoardResult></GetDepartureBoardResponse></soap:Body></soap:Envelope>"#;

    #[test]
    fn test_normalize_operator() {
        assert_eq!(normalize_operator("London North Eastern Railway"), "LNER");
        assert_eq!(normalize_operator("  Great Western Railway "), "Great Western");
        assert_eq!(normalize_operator(" Avanti West Coast"), "Avanti West Coast");
        assert_eq!(normalize_operator(""), "");
    }

    #[test]
    fn test_parse_euston_board() {
        let board = parse_board(EUSTON_RESPONSE, BoardKind::Departures, "EUS", 8);
        assert_eq!(board.title, "Euston");
        assert_eq!(board.generated_at, TimeOfDay::new(10, 1, 42));
        assert_eq!(board.services.len(), 3);

        let first = &board.services[0];
        assert_eq!(first.time, "10:05");
        assert_eq!(first.estimate, "On time");
        assert_eq!(first.platform, "3");
        assert_eq!(first.operator, "LNER");
        assert_eq!(first.place, "Edinburgh");
        assert!(!first.is_bus);

        let second = &board.services[1];
        assert_eq!(second.place, "Birmingham New Street");
        assert_eq!(second.operator, "West Midlands");
        assert_eq!(second.estimate, "10:20");

        let bus = &board.services[2];
        assert!(bus.is_bus);
        assert_eq!(bus.platform, "");
        assert_eq!(bus.estimate, "On time");
        assert_eq!(bus.place, "Milton Keynes & Bletchley");
    }

    #[test]
    fn test_parse_advisories() {
        let board = parse_board(EUSTON_RESPONSE, BoardKind::Departures, "EUS", 8);
        assert_eq!(
            board.advisories,
            ["Delays expected & some cancellations.", "Lifts out of order"]
        );
    }

    #[test]
    fn test_row_cap_truncates_in_order() {
        let board = parse_board(EUSTON_RESPONSE, BoardKind::Departures, "EUS", 2);
        assert_eq!(board.services.len(), 2);
        assert_eq!(board.services[0].time, "10:05");
        assert_eq!(board.services[1].time, "10:12");
    }

    #[test]
    fn test_no_train_services() {
        let body = "<lt4:locationName>Euston</lt4:locationName><lt4:crs>EUS</lt4:crs>";
        let board = parse_board(body, BoardKind::Departures, "EUS", 8);
        assert!(board.services.is_empty());
        assert_eq!(board.title, "Euston");

        let board = parse_board("<GetStationBoardResult/>", BoardKind::Departures, "EUS", 8);
        assert!(board.services.is_empty());
        assert!(board.advisories.is_empty());
        assert_eq!(board.title, "EUS");
        assert_eq!(board.generated_at, None);
    }

    #[test]
    fn test_arrivals_use_origin_and_sta() {
        let body = "<trainServices><service><sta>09:58</sta><eta>Delayed</eta>\
            <origin><location><locationName>Manchester Piccadilly</locationName></location></origin>\
            <destination><location><locationName>Euston</locationName></location></destination>\
            </service></trainServices>";
        let board = parse_board(body, BoardKind::Arrivals, "EUS", 8);
        assert_eq!(board.services[0].time, "09:58");
        assert_eq!(board.services[0].estimate, "Delayed");
        assert_eq!(board.services[0].place, "Manchester Piccadilly");
    }

    #[test]
    fn test_category_bus_clears_platform() {
        let svc = "<std>11:00</std><platform>4</platform><category>BUS</category>\
            <destination><location><locationName>Watford</locationName></location></destination>";
        let row = parse_service(svc, BoardKind::Departures).unwrap();
        assert!(row.is_bus);
        assert_eq!(row.platform, "");
    }

    #[test]
    fn test_bus_heuristics_in_order() {
        let none = BusHints::default();
        assert!(!is_bus_service(&none));
        assert!(is_bus_service(&BusHints { service_type: "Bus", ..none }));
        assert!(is_bus_service(&BusHints { is_bus: "TRUE", ..none }));
        assert!(is_bus_service(&BusHints { is_bus: "1", ..none }));
        assert!(!is_bus_service(&BusHints { is_bus: "false", ..none }));
        assert!(is_bus_service(&BusHints { category: "replacementBus", ..none }));
        assert!(is_bus_service(&BusHints { platform: " Coach ", ..none }));
        assert!(!is_bus_service(&BusHints { platform: "bus stop", ..none }));
        assert!(is_bus_service(&BusHints { operator: "Rail Replacement", ..none }));
        assert!(!is_bus_service(&BusHints { service_type: "train", operator: "LNER", ..none }));
    }

    #[test]
    fn test_clean_advisory() {
        assert_eq!(
            clean_advisory("<p>Engineering   works&nbsp;&nbsp;tonight. More <a href=\"x\">info</a>.</p>"),
            "Engineering works tonight."
        );
        assert_eq!(clean_advisory("<b"), "");
        assert_eq!(clean_advisory("  Strike action!  Expect delays"), "Strike action!");
    }
}
