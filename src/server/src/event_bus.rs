// Copyright © moonhollow 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use data::core::primitives::GameId;
use data::events::{EventEnvelope, GameEvent};
use tokio::sync::broadcast;
use tracing::trace;

/// Typed event stream consumed by presentation adapters.
///
/// Delivery is best-effort over a bounded broadcast channel: the engine
/// never blocks on a subscriber, and a lagging subscriber loses events from
/// the tail rather than slowing the mutating path.
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

const CHANNEL_CAPACITY: usize = 1024;

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Publishes one dispatch turn's events for a game, appending the single
    /// coalesced panel-refresh signal when any of them warrants one.
    pub fn publish_turn(&self, game_id: GameId, at_unix_ms: u64, events: Vec<GameEvent>) {
        let wants_refresh = events.iter().any(GameEvent::refreshes_panels);
        for event in events {
            self.publish(game_id, at_unix_ms, event);
        }
        if wants_refresh {
            self.publish(game_id, at_unix_ms, GameEvent::PanelsRefresh);
        }
    }

    pub fn publish(&self, game_id: GameId, at_unix_ms: u64, event: GameEvent) {
        trace!(?game_id, ?event, "Publishing event");
        // Err means no subscribers, which is fine.
        let _ = self.sender.send(EventEnvelope { game_id, at_unix_ms, event });
    }
}

#[cfg(test)]
mod tests {
    use data::game_states::phase::{Phase, SubPhase};

    use super::*;

    #[tokio::test]
    async fn one_refresh_per_turn() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        bus.publish_turn(
            GameId(1),
            0,
            vec![
                GameEvent::PhaseChanged { phase: Phase::Night, day: 0 },
                GameEvent::SubPhaseChanged { sub_phase: SubPhase::Lobby },
            ],
        );

        let mut refreshes = 0;
        let mut total = 0;
        while let Ok(envelope) = receiver.try_recv() {
            total += 1;
            if envelope.event == GameEvent::PanelsRefresh {
                refreshes += 1;
            }
        }
        assert_eq!(total, 3);
        assert_eq!(refreshes, 1);
    }

    #[tokio::test]
    async fn no_refresh_for_chatter() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        bus.publish_turn(
            GameId(1),
            0,
            vec![GameEvent::LobbyUpdated { players: vec![] }],
        );
        let mut total = 0;
        while receiver.try_recv().is_ok() {
            total += 1;
        }
        assert_eq!(total, 1);
    }
}
