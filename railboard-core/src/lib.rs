//! Board-agnostic core logic for the Railboard departure board
//!
//! This crate contains all application logic that does not depend on the
//! ESP32-S3 board, the panel driver or the network stack:
//!
//! - Collaborator traits (pixel surface, file store, HTTPS transport)
//! - Text fitting and cleanup helpers
//! - Board model, response parsing, fetch guard and fetch pipeline
//! - Ticker cache, ribbon composition and the ticker frame engine
//! - Screen layout, painters and the display-lock orchestrator
//! - Wall clock, poll cadence and due-time scheduling
//! - Persisted settings and the JSON control surface
//!
//! Everything here runs on the host under `cargo test`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod api;
pub mod board;
pub mod clock;
pub mod config;
pub mod graphics;
pub mod render;
pub mod scheduler;
pub mod text;
pub mod ticker;
pub mod traits;
