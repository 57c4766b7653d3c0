//! Match results.
//!
//! The terminal payload attached to a finished session, plus the call
//! contract for the win detector that produces it. The session treats the
//! payload as opaque; the concrete line-scanning algorithm lives with the
//! integrating layer, not here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::board::{Board, Position};

/// Result of a finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchResult {
    /// A participant completed a run of `threshold` marks.
    Win {
        player_id: Uuid,
        /// The winning run of cells, in board order.
        line: Vec<Position>,
    },
    /// Board exhausted with no winning run.
    Draw,
}

impl MatchResult {
    /// Winner identity, if any.
    pub fn winner(&self) -> Option<Uuid> {
        match self {
            Self::Win { player_id, .. } => Some(*player_id),
            Self::Draw => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Win { player_id, line } => {
                let line: Vec<serde_json::Value> =
                    line.iter().map(|p| p.to_json()).collect();
                serde_json::json!({
                    "kind": "win",
                    "player_id": player_id.to_string(),
                    "line": line
                })
            }
            Self::Draw => serde_json::json!({"kind": "draw"}),
        }
    }
}

/// Call contract of the win detector.
///
/// Implementations scan the board for a run of `threshold` same-mark cells
/// and report the result; the session only stores what they produce.
pub trait WinDetector {
    /// Inspect the board, returning a result when the match is decided.
    fn detect(&self, board: &Board, threshold: usize) -> Option<MatchResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_winner() {
        let id = Uuid::new_v4();
        let win = MatchResult::Win {
            player_id: id,
            line: vec![Position::new(0, 0), Position::new(0, 1)],
        };
        assert_eq!(win.winner(), Some(id));
        assert!(!win.is_draw());

        let draw = MatchResult::Draw;
        assert_eq!(draw.winner(), None);
        assert!(draw.is_draw());
    }

    #[test]
    fn test_to_json() {
        let id = Uuid::new_v4();
        let win = MatchResult::Win {
            player_id: id,
            line: vec![Position::new(1, 2)],
        };
        assert_eq!(
            win.to_json(),
            serde_json::json!({
                "kind": "win",
                "player_id": id.to_string(),
                "line": [{"x": 1, "y": 2}]
            })
        );
        assert_eq!(MatchResult::Draw.to_json(), serde_json::json!({"kind": "draw"}));
    }
}
