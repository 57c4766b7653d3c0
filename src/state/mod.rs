//! State management module for GridMatch.
//!
//! This module provides the core state types:
//!
//! - `board` - The shared square grid and cell marks
//! - `result` - Terminal match payloads and the win-detector contract
//! - `session` - The match session state machine, builder, and manager
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      SessionManager                        │
//! │                                                            │
//! │  session_id → Session          player_id → session_id      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │                 Session (per match)                  │  │
//! │  │                                                      │  │
//! │  │  WaitingForOpponent ──▶ InProgress ──▶ Finished      │  │
//! │  │                                                      │  │
//! │  │  Board · turn counters · threshold · MatchResult     │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Turn-order enforcement is split between a query ([`Session::can_move`])
//! and a mutation ([`Session::attempt_move`]); the session itself never
//! rejects a move for being out of turn. Callers serialize access to each
//! session (one lock or owner task per session id) and gate on the query.

pub mod board;
pub mod result;
pub mod session;

// Re-export commonly used types
pub use board::{Board, Cell, Position, DEFAULT_DIMENSION};
pub use result::{MatchResult, WinDetector};
pub use session::{
    IdSource, MoveOutcome, RandomIdSource, Session, SessionBuilder, SessionManager,
    SessionStatus,
};
