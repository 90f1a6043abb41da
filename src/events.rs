use serde::Serialize;

use crate::game::GameResult;
use crate::moves::MoveRecord;
use crate::types::Color;

/// Notifications for observers. The engine queues them and the caller drains the
/// queue with `GameState::drain_events`; how they are delivered is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    MoveApplied {
        record: MoveRecord,
        active_color: Color,
        is_check: bool,
    },
    #[serde(rename_all = "camelCase")]
    TurnChanged { active_color: Color },
    GameEnded {
        result: GameResult,
        winner: Option<Color>,
    },
    GameReset,
}
