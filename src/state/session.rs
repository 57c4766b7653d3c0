//! Match session state machine.
//!
//! A session is one match between two participants on a shared board. It
//! owns the board, participant identities, turn bookkeeping, and lifecycle
//! status, and it enforces move legality at the cell level.
//!
//! # State Diagram
//!
//! ```text
//! ┌────────────────────┐  bind_opponent(Some)  ┌──────────────┐
//! │ WaitingForOpponent │──────────────────────▶│  InProgress  │
//! └─────────┬──────────┘                       └──────┬───────┘
//!           │                                         │
//!           │ set_status(Finished) / set_result       │
//!           ▼                                         ▼
//!     ┌──────────┐◀────────────────────────────────────┘
//!     │ Finished │   (terminal, no resurrection)
//!     └──────────┘
//! ```
//!
//! # Turn bookkeeping
//!
//! The session keeps one counter per participant, incremented on every move
//! *attempt*, accepted or not. Turn order is not enforced inside
//! [`Session::attempt_move`]; callers consult [`Session::can_move`] first
//! and serialize access themselves (one lock or owner task per session).
//! The query/mutate split is deliberate: reconstruction and transport
//! layers rely on being able to drive the session without a rejection path.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;
use uuid::Uuid;

use super::board::{Board, Cell};
use super::result::MatchResult;

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created by the owner, no opponent yet
    #[default]
    WaitingForOpponent,
    /// Both participants bound, match underway
    InProgress,
    /// Match over (decided or abandoned)
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForOpponent => "waiting_for_opponent",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
        }
    }

    /// Check if the session can no longer change phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged result of a move attempt.
///
/// Never an error: an ignored attempt leaves the board untouched but still
/// consumes the actor's turn (see [`Session::attempt_move`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Cell was in range and empty; mark written
    Accepted,
    /// Coordinates outside the board; ignored
    OutOfRange,
    /// Cell already marked; ignored
    Occupied,
}

impl MoveOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::OutOfRange => "out_of_range",
            Self::Occupied => "occupied",
        }
    }
}

/// Source of fresh session identifiers and default names.
///
/// Constructors that take no explicit source fall back to
/// [`RandomIdSource`]; tests inject deterministic sources instead.
pub trait IdSource {
    fn next_id(&mut self) -> Uuid;
    fn next_name(&mut self) -> String;
}

/// Default source backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }

    fn next_name(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Match session state.
#[derive(Clone)]
pub struct Session {
    /// Unique session ID, never reused
    id: Uuid,

    /// Human-readable label
    name: String,

    /// The shared board
    board: Board,

    /// Creating participant
    owner_id: Uuid,

    /// Joining participant, absent until bound
    opponent_id: Option<Uuid>,

    /// Moves attempted by the owner (accepted or not)
    owner_turn_count: u32,

    /// Moves attempted by the opponent (accepted or not)
    opponent_turn_count: u32,

    /// Current lifecycle phase
    status: SessionStatus,

    /// Terminal payload, present only once finished with a decision
    result: Option<MatchResult>,

    /// Same-mark run length required to win
    threshold: usize,

    /// When the most recent *accepted* move landed
    last_move_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Which visual mark the owner uses; presentational only
    owner_plays_cross: bool,

    /// When the session was created
    created_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    /// Create a session with a random id and name on a default board.
    pub fn new(owner_id: Uuid) -> Self {
        Self::new_with(&mut RandomIdSource, owner_id)
    }

    /// Create a session drawing id and name from the given source.
    pub fn new_with(ids: &mut dyn IdSource, owner_id: Uuid) -> Self {
        Self::from_parts(ids, owner_id, None, Board::default(), None)
    }

    /// Create a session with an explicit name and win threshold.
    ///
    /// The threshold is clamped into `[1, dimension]`; construction never
    /// fails.
    pub fn with_rules(owner_id: Uuid, name: impl Into<String>, threshold: usize) -> Self {
        Self::from_parts(
            &mut RandomIdSource,
            owner_id,
            Some(name.into()),
            Board::default(),
            Some(threshold),
        )
    }

    /// Create a session around a pre-built board.
    pub fn with_board(
        owner_id: Uuid,
        name: impl Into<String>,
        board: Board,
        threshold: usize,
    ) -> Self {
        Self::from_parts(
            &mut RandomIdSource,
            owner_id,
            Some(name.into()),
            board,
            Some(threshold),
        )
    }

    fn from_parts(
        ids: &mut dyn IdSource,
        owner_id: Uuid,
        name: Option<String>,
        board: Board,
        threshold: Option<usize>,
    ) -> Self {
        let dimension = board.dimension();
        let threshold = match threshold {
            Some(t) => t.min(dimension).max(1),
            None => dimension,
        };
        Self {
            id: ids.next_id(),
            name: name.unwrap_or_else(|| ids.next_name()),
            board,
            owner_id,
            opponent_id: None,
            owner_turn_count: 0,
            opponent_turn_count: 0,
            status: SessionStatus::WaitingForOpponent,
            result: None,
            threshold,
            last_move_at: None,
            owner_plays_cross: true,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read view of the board. Mutation goes through [`Self::attempt_move`].
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn opponent_id(&self) -> Option<Uuid> {
        self.opponent_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn owner_turn_count(&self) -> u32 {
        self.owner_turn_count
    }

    pub fn opponent_turn_count(&self) -> u32 {
        self.opponent_turn_count
    }

    pub fn last_move_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.last_move_at
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    pub fn owner_plays_cross(&self) -> bool {
        self.owner_plays_cross
    }

    pub fn set_owner_plays_cross(&mut self, owner_plays_cross: bool) {
        self.owner_plays_cross = owner_plays_cross;
    }

    /// Visual mark of the owner, per the presentational flag.
    pub fn owner_mark_char(&self) -> char {
        if self.owner_plays_cross {
            'X'
        } else {
            'O'
        }
    }

    /// Check if the given participant is the session owner.
    pub fn is_owner(&self, player_id: Uuid) -> bool {
        self.owner_id == player_id
    }

    /// Bind the joining participant.
    ///
    /// A `Some` id is stored and moves the session to `InProgress` (the
    /// only trigger for that transition). `None` is a silent no-op;
    /// callers needing validation validate first. Nothing here rejects
    /// re-binding or binding the owner's own id.
    pub fn bind_opponent(&mut self, opponent_id: Option<Uuid>) {
        if let Some(opponent_id) = opponent_id {
            self.opponent_id = Some(opponent_id);
            self.status = SessionStatus::InProgress;
            debug!(session = %self.id, opponent = %opponent_id, "opponent bound");
        }
    }

    /// Attempt a move at `(x, y)` on behalf of a participant.
    ///
    /// The mark lands only when the cell is in range and empty; an accepted
    /// move also stamps `last_move_at`. The actor's turn counter is
    /// incremented *regardless* of acceptance, so an illegal attempt still
    /// consumes a turn. Turn order is not checked here; callers gate on
    /// [`Self::can_move`] first.
    pub fn attempt_move(&mut self, player_id: Uuid, x: usize, y: usize) -> MoveOutcome {
        let outcome = if !self.board.in_range(x, y) {
            MoveOutcome::OutOfRange
        } else if !self.board.is_free(x, y) {
            MoveOutcome::Occupied
        } else {
            let mark = if self.is_owner(player_id) {
                Cell::Owner
            } else {
                Cell::Opponent
            };
            self.board.set(x, y, mark);
            self.last_move_at = Some(chrono::Utc::now());
            MoveOutcome::Accepted
        };
        self.inc_turn_counter(player_id);
        debug!(
            session = %self.id,
            player = %player_id,
            x,
            y,
            outcome = outcome.as_str(),
            "move attempted"
        );
        outcome
    }

    /// Any participant other than the owner counts against the opponent.
    fn inc_turn_counter(&mut self, player_id: Uuid) {
        if self.is_owner(player_id) {
            self.owner_turn_count += 1;
        } else {
            self.opponent_turn_count += 1;
        }
    }

    /// Check if the participant may move next.
    ///
    /// True while the actor's counter is not ahead of the other side's.
    /// With both counters starting at zero and callers honoring this
    /// predicate, turns strictly alternate and the counters never differ
    /// by more than one.
    pub fn can_move(&self, player_id: Uuid) -> bool {
        let (own, other) = if self.is_owner(player_id) {
            (self.owner_turn_count, self.opponent_turn_count)
        } else {
            (self.opponent_turn_count, self.owner_turn_count)
        };
        (own as i64) - (other as i64) < 1
    }

    pub fn is_waiting(&self) -> bool {
        self.status == SessionStatus::WaitingForOpponent
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    /// Set the lifecycle phase directly.
    ///
    /// `Finished` with no result models abandonment.
    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    /// Attach the terminal result, finishing the session if it is not
    /// finished already. A second call overwrites; last write wins.
    pub fn set_result(&mut self, result: MatchResult) {
        if !self.is_finished() {
            self.status = SessionStatus::Finished;
        }
        debug!(session = %self.id, winner = ?result.winner(), "result recorded");
        self.result = Some(result);
    }

    /// Overwrite the win threshold.
    ///
    /// Not re-validated against the board dimension; the clamp applies at
    /// construction only.
    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    /// Convert full session state to a JSON snapshot.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.to_string(),
            "name": self.name,
            "status": self.status.as_str(),
            "board": self.board.to_json(),
            "owner_id": self.owner_id.to_string(),
            "opponent_id": self.opponent_id.map(|id| id.to_string()),
            "owner_turn_count": self.owner_turn_count,
            "opponent_turn_count": self.opponent_turn_count,
            "threshold": self.threshold,
            "owner_mark": self.owner_mark_char().to_string(),
            "result": self.result.as_ref().map(|r| r.to_json()),
            "last_move_at": self.last_move_at.map(|t| t.to_rfc3339()),
            "created_at": self.created_at.to_rfc3339()
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &self.status)
            .field("owner_id", &self.owner_id)
            .field("opponent_id", &self.opponent_id)
            .field("owner_turn_count", &self.owner_turn_count)
            .field("opponent_turn_count", &self.opponent_turn_count)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// Sessions are the same entity iff their ids match.
impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Session {}

impl Hash for Session {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Reconstruction builder.
///
/// Rehydrates a session from externally supplied field values (e.g. loaded
/// from storage) without re-running lifecycle rules: turn counters are
/// written directly, so a resumed match can carry values the play-by-play
/// path could never produce. No cross-field validation is performed;
/// reconstruction trusts its input completely.
#[derive(Debug)]
pub struct SessionBuilder {
    owner_id: Uuid,
    board: Option<Board>,
    name: Option<String>,
    opponent_id: Option<Uuid>,
    status: Option<SessionStatus>,
    threshold: Option<usize>,
    owner_turn_count: u32,
    opponent_turn_count: u32,
}

impl SessionBuilder {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            board: None,
            name: None,
            opponent_id: None,
            status: None,
            threshold: None,
            owner_turn_count: 0,
            opponent_turn_count: 0,
        }
    }

    /// Use a pre-existing board instead of a fresh empty one.
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = Some(board);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_opponent(mut self, opponent_id: Uuid) -> Self {
        self.opponent_id = Some(opponent_id);
        self
    }

    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_owner_turns(mut self, owner_turn_count: u32) -> Self {
        self.owner_turn_count = owner_turn_count;
        self
    }

    pub fn with_opponent_turns(mut self, opponent_turn_count: u32) -> Self {
        self.opponent_turn_count = opponent_turn_count;
        self
    }

    /// Finalize with a random id (reconstructed sessions get a fresh id).
    pub fn build(self) -> Session {
        self.build_with(&mut RandomIdSource)
    }

    /// Finalize, drawing the id and any missing name from the source.
    ///
    /// Base-constructs from owner, name, and board, then replays opponent
    /// binding (same silent-no-op-on-`None` rule), applies status and
    /// threshold only if explicitly provided, and finally force-writes
    /// both turn counters.
    pub fn build_with(self, ids: &mut dyn IdSource) -> Session {
        let mut session = Session::from_parts(
            ids,
            self.owner_id,
            self.name,
            self.board.unwrap_or_default(),
            None,
        );
        session.bind_opponent(self.opponent_id);
        if let Some(status) = self.status {
            session.set_status(status);
        }
        if let Some(threshold) = self.threshold {
            session.set_threshold(threshold);
        }
        session.owner_turn_count = self.owner_turn_count;
        session.opponent_turn_count = self.opponent_turn_count;
        session
    }
}

/// Session manager - tracks all live sessions with indexed access.
///
/// Pure in-memory registry; pairing players up is the caller's business.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<Uuid, Session>,
    /// Participant ID to session ID
    player_index: HashMap<Uuid, Uuid>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session, indexing its participants.
    pub fn add(&mut self, session: Session) {
        self.player_index.insert(session.owner_id(), session.id());
        if let Some(opponent_id) = session.opponent_id() {
            self.player_index.insert(opponent_id, session.id());
        }
        self.sessions.insert(session.id(), session);
    }

    pub fn get(&self, session_id: Uuid) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    pub fn get_mut(&mut self, session_id: Uuid) -> Option<&mut Session> {
        self.sessions.get_mut(&session_id)
    }

    /// Get the session a participant belongs to.
    pub fn get_for_player(&self, player_id: Uuid) -> Option<&Session> {
        self.player_index
            .get(&player_id)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn get_for_player_mut(&mut self, player_id: Uuid) -> Option<&mut Session> {
        let id = *self.player_index.get(&player_id)?;
        self.sessions.get_mut(&id)
    }

    /// Bind an opponent through the manager, keeping the index current.
    ///
    /// Returns false when the session is unknown.
    pub fn bind_opponent(&mut self, session_id: Uuid, opponent_id: Uuid) -> bool {
        match self.sessions.get_mut(&session_id) {
            Some(session) => {
                session.bind_opponent(Some(opponent_id));
                self.player_index.insert(opponent_id, session_id);
                true
            }
            None => false,
        }
    }

    /// Remove a session and its index entries.
    pub fn remove(&mut self, session_id: Uuid) -> Option<Session> {
        let session = self.sessions.remove(&session_id)?;
        self.player_index.remove(&session.owner_id());
        if let Some(opponent_id) = session.opponent_id() {
            self.player_index.remove(&opponent_id);
        }
        Some(session)
    }

    /// Drop finished sessions, returning their ids.
    pub fn cleanup_finished(&mut self) -> Vec<Uuid> {
        let finished: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.status().is_terminal())
            .map(|(id, _)| *id)
            .collect();

        for id in &finished {
            self.remove(*id);
        }

        finished
    }

    /// Count sessions still waiting for an opponent.
    pub fn waiting_count(&self) -> usize {
        self.sessions.values().filter(|s| s.is_waiting()).count()
    }

    /// Count sessions with a match underway.
    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|s| s.is_in_progress()).count()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}
