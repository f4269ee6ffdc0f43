//! Darwin OpenLDBWS wire protocol
//!
//! This crate holds the parts of the National Rail Darwin "Lite" web
//! service that are independent of any board or renderer: the SOAP
//! request envelope, the board-kind vocabulary, fault extraction, and a
//! streaming tag extractor used to pull fields out of responses.
//!
//! # Extraction model
//!
//! Responses are never parsed into a tree. Fields are located by local
//! element name with [`find_first`] and repeated siblings are walked with
//! [`find_next`] (or the [`Elements`] iterator). Every result borrows from
//! the response buffer:
//! ```text
//! <soap:Envelope> ... <lt7:trainServices>
//!     <lt7:service> ... </lt7:service>   <- find_next(.., "service", &mut cursor)
//!     <lt7:service> ... </lt7:service>
//! </lt7:trainServices> ...
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod envelope;
pub mod fault;
pub mod scan;

pub use envelope::{BoardKind, BoardRequest, EnvelopeError, DARWIN_URL, MAX_ROWS};
pub use fault::extract_fault;
pub use scan::{elements, find_first, find_next, Elements};
