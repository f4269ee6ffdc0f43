//! Board data model and fetch pipeline
//!
//! The pipeline builds the request, performs the guarded round-trip,
//! parses the response and commits a fresh snapshot.

pub mod guard;
pub mod model;
pub mod parse;
pub mod pipeline;

pub use guard::{FetchGuard, FetchPermit, GuardRejection, DEBOUNCE_MS};
pub use model::{BoardSnapshot, ServiceRow, Services, SharedBoard, DEFAULT_ROWS, MAX_SERVICES};
pub use parse::{normalize_operator, parse_board};
pub use pipeline::{BoardQuery, FetchPipeline, PollOutcome, FETCH_TIMEOUT_MS};
