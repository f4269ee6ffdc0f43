//! Fetch pipeline
//!
//! One poll walks `Idle -> Guarded -> InFlight -> {Success, Fault,
//! TransportError} -> Idle`. The board is only replaced on success; every
//! failure leaves the previous snapshot in place.

use alloc::string::String;

use embassy_sync::blocking_mutex::raw::RawMutex;
use railboard_protocol::envelope::{ACCEPT, CONNECTION};
use railboard_protocol::{extract_fault, BoardKind, BoardRequest, EnvelopeError, DARWIN_URL};

use super::guard::{FetchGuard, GuardRejection};
use super::model::SharedBoard;
use super::parse::parse_board;
use crate::traits::{HttpRequest, Transport, TransportError};

/// Connect and response timeout for one round-trip
pub const FETCH_TIMEOUT_MS: u64 = 12_000;

/// What to ask the service for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardQuery<'a> {
    pub kind: BoardKind,
    /// Station code, also the title fallback
    pub crs: &'a str,
    pub rows: u8,
    pub token: &'a str,
}

/// Result of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Board replaced
    Updated { services: usize, advisories: usize },
    /// Service answered with a non-200 status
    Fault { status: u16, reason: String },
    /// Round-trip failed or timed out
    Transport(TransportError),
    /// Request could not be encoded
    Request(EnvelopeError),
    /// Guard turned the attempt away; nothing was sent
    Rejected(GuardRejection),
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Updated { .. })
    }
}

/// Owns the fetch guard and the shared board
pub struct FetchPipeline<M: RawMutex> {
    guard: FetchGuard<M>,
    board: SharedBoard<M>,
}

impl<M: RawMutex> FetchPipeline<M> {
    pub const fn new() -> Self {
        Self {
            guard: FetchGuard::new(),
            board: SharedBoard::new(),
        }
    }

    /// The board this pipeline commits to
    pub fn board(&self) -> &SharedBoard<M> {
        &self.board
    }

    pub fn guard(&self) -> &FetchGuard<M> {
        &self.guard
    }

    /// Run one guarded fetch at `now_ms`
    ///
    /// The transport is expected to enforce [`FETCH_TIMEOUT_MS`].
    pub async fn poll<T: Transport>(
        &self,
        transport: &mut T,
        query: &BoardQuery<'_>,
        now_ms: u64,
    ) -> PollOutcome {
        let _permit = match self.guard.try_begin(now_ms) {
            Ok(permit) => permit,
            Err(rejection) => return PollOutcome::Rejected(rejection),
        };

        let request = BoardRequest::new(query.kind, query.crs, query.rows, query.token);
        let (envelope, content_type) = match (request.envelope(), request.content_type()) {
            (Ok(envelope), Ok(content_type)) => (envelope, content_type),
            (Err(e), _) | (_, Err(e)) => return PollOutcome::Request(e),
        };
        let headers = [
            ("Content-Type", content_type.as_str()),
            ("Accept", ACCEPT),
            ("Connection", CONNECTION),
        ];

        let response = match transport
            .post(&HttpRequest {
                url: DARWIN_URL,
                headers: &headers,
                body: envelope.as_bytes(),
            })
            .await
        {
            Ok(response) => response,
            Err(e) => return PollOutcome::Transport(e),
        };

        if response.status != 200 {
            return PollOutcome::Fault {
                status: response.status,
                reason: extract_fault(&response.body).into(),
            };
        }

        let snapshot = parse_board(&response.body, query.kind, query.crs, query.rows as usize);
        let outcome = PollOutcome::Updated {
            services: snapshot.services.len(),
            advisories: snapshot.advisories.len(),
        };
        self.board.commit(snapshot);
        outcome
    }
}

impl<M: RawMutex> Default for FetchPipeline<M> {
    fn default() -> Self {
        Self::new()
    }
}
