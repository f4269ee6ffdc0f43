//! Best-effort extraction of SOAP fault text

use crate::scan::find_first;

/// Pull a human-readable reason out of a fault response
///
/// SOAP 1.1 style `faultstring` wins; otherwise the SOAP 1.2
/// `Reason/Text` pair is used. Returns an empty string when neither is
/// present.
pub fn extract_fault(body: &str) -> &str {
    if let Some(text) = find_first(body, "faultstring", 0).filter(|s| !s.is_empty()) {
        return text;
    }
    find_first(body, "Reason", 0)
        .and_then(|reason| find_first(reason, "Text", 0))
        .unwrap_or("")
}
