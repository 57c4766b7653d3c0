//! GridMatch State Library
//!
//! This crate provides match session state management for GridMatch, an
//! N-in-a-row board game (a generalized tic-tac-toe/gomoku) between two
//! participants on a square grid.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Session State Machine** - Creation, opponent binding, cell mutation,
//!   and status/result transitions for a single match.
//!
//! - **Reconstruction Builder** - Rehydrates sessions from external storage
//!   with arbitrary historical field values, bypassing lifecycle rules.
//!
//! - **Session Manager** - Indexed in-memory access by session or player.
//!
//! # Design Principles
//!
//! 1. **Fail silently, clamp at entry** - Invalid input is ignored or
//!    clamped, never an error; stricter validation belongs to the caller.
//!
//! 2. **Query/mutate split** - Turn order is a query (`can_move`), not a
//!    gate inside the move path; callers check first.
//!
//! 3. **No networking, no persistence** - This crate is pure state; every
//!    operation is a synchronous in-memory update.
//!
//! 4. **Serialization-ready** - All types can be converted to JSON for
//!    clients.
//!
//! # Example
//!
//! ```rust
//! use gridmatch_state::state::{MoveOutcome, Session};
//! use uuid::Uuid;
//!
//! let owner = Uuid::new_v4();
//! let mut session = Session::new(owner);
//! assert!(session.is_waiting());
//!
//! // Opponent joins
//! let opponent = Uuid::new_v4();
//! session.bind_opponent(Some(opponent));
//! assert!(session.is_in_progress());
//!
//! // Owner opens, checking turn order first
//! assert!(session.can_move(owner));
//! let outcome = session.attempt_move(owner, 0, 0);
//! assert_eq!(outcome, MoveOutcome::Accepted);
//! assert_eq!(session.owner_turn_count(), 1);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
