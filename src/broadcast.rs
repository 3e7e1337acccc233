//! Per-game push notifications
//!
//! Every game session owns a broadcast channel. The engine publishes a
//! [`GameEvent`] the moment a round starts or a quorum is reached, so callers
//! can wait on the channel instead of polling the predicates.

use crate::types::{GameId, PlayerId, RoundId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined { player_id: PlayerId },
    RoundStarted { round_id: RoundId, number: u32 },
    AllAnswered { round_id: RoundId },
    AllVoted { round_id: RoundId },
    ScoreUpdated { player_id: PlayerId, points: u32 },
    GameCompleted { game_id: GameId },
}

/// Publish an event, ignoring the "no subscribers" case
pub(crate) fn publish(tx: &broadcast::Sender<GameEvent>, event: GameEvent) {
    tracing::debug!("Publishing {:?}", event);
    // No receivers connected is fine
    let _ = tx.send(event);
}

/// Wait until `ready()` holds or `timeout` elapses.
///
/// `ready` is checked up front and again after every event, so a quorum
/// reached before the caller subscribed is not missed. Returns the final
/// value of `ready()`. Missed (lagged) events only trigger a re-check.
pub async fn wait_until<F>(
    rx: &mut broadcast::Receiver<GameEvent>,
    timeout: Duration,
    mut ready: F,
) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;

    loop {
        if ready() {
            return true;
        }

        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Ok(_)) => continue,
            Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                tracing::debug!("Event receiver lagged by {} messages", skipped);
                continue;
            }
            Ok(Err(broadcast::error::RecvError::Closed)) => return ready(),
            Err(_) => {
                tracing::debug!("Wait deadline of {:?} passed", timeout);
                return ready();
            }
        }
    }
}
