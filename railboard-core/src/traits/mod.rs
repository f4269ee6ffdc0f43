//! Collaborator traits
//!
//! These traits define the interface between the board logic and the
//! platform: pixels, files, and the network.

pub mod display;
pub mod storage;
pub mod transport;

pub use display::{Anchor, Canvas, Display, DisplayError, FontFace, TextMeasure};
pub use storage::{FileStore, StorageError};
pub use transport::{HttpRequest, HttpResponse, Transport, TransportError};
