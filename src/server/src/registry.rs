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

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use data::actions::intent::GameRef;
use data::core::primitives::{ChannelId, GameId, PlayerId};
use data::game_states::game_state::GameState;

use crate::engine::IntentReply;
use crate::game_actor::GameHandle;

/// The in-memory game registry: authoritative runtime copies of every live
/// game, guarded by copy-on-write.
///
/// Mutations publish a fresh `Arc<GameState>` (pointer swap); readers clone
/// the `Arc` and see a consistent snapshot without ever blocking a writer.
#[derive(Default)]
pub struct Registry {
    games: DashMap<GameId, Arc<GameState>>,
    channels: DashMap<ChannelId, GameId>,
    handles: DashMap<GameId, GameHandle>,
}

impl Registry {
    pub fn snapshot(&self, id: GameId) -> Option<Arc<GameState>> {
        self.games.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Resolves a game reference, following the secondary channel index.
    pub fn resolve(&self, game_ref: GameRef) -> Option<GameId> {
        match game_ref {
            GameRef::Game(id) => self.games.contains_key(&id).then_some(id),
            GameRef::Channel(channel) => self.channels.get(&channel).map(|entry| *entry.value()),
        }
    }

    /// Publishes a new snapshot and refreshes the channel index from it.
    pub fn publish(&self, game: Arc<GameState>) {
        for channel in game.channels.iter() {
            self.channels.insert(channel, game.id);
        }
        self.games.insert(game.id, game);
    }

    pub fn remove(&self, id: GameId) {
        if let Some((_, game)) = self.games.remove(&id) {
            for channel in game.channels.iter() {
                self.channels.remove(&channel);
            }
        }
        self.handles.remove(&id);
    }

    pub fn contains(&self, id: GameId) -> bool {
        self.games.contains_key(&id)
    }

    pub fn handle(&self, id: GameId) -> Option<GameHandle> {
        self.handles.get(&id).map(|entry| entry.value().clone())
    }

    pub fn install_handle(&self, id: GameId, handle: GameHandle) {
        self.handles.insert(id, handle);
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        self.games.iter().map(|entry| *entry.key()).collect()
    }

    /// Drops every mailbox sender so actors drain and stop. Shutdown only.
    pub fn clear_handles(&self) {
        self.handles.clear();
    }
}

/// Short-lived memory of answered intents, so front-end retries are served
/// the original result instead of being re-applied.
///
/// Only intents carrying a `client_seq` participate; the key is
/// `(game, actor, verb, seq)`.
pub struct DuplicateGuard {
    window: Duration,
    seen: DashMap<(GameId, PlayerId, &'static str, u64), (Instant, IntentReply)>,
}

impl DuplicateGuard {
    pub fn new(window_ms: u64) -> Self {
        Self { window: Duration::from_millis(window_ms), seen: DashMap::new() }
    }

    pub fn check(
        &self,
        game: GameId,
        actor: PlayerId,
        verb: &'static str,
        seq: u64,
    ) -> Option<IntentReply> {
        let key = (game, actor, verb, seq);
        let entry = self.seen.get(&key)?;
        let (at, reply) = entry.value();
        if at.elapsed() <= self.window {
            Some(reply.clone())
        } else {
            drop(entry);
            self.seen.remove(&key);
            None
        }
    }

    pub fn record(
        &self,
        game: GameId,
        actor: PlayerId,
        verb: &'static str,
        seq: u64,
        reply: IntentReply,
    ) {
        self.seen.insert((game, actor, verb, seq), (Instant::now(), reply));
        // Opportunistic pruning keeps the map bounded without a sweeper task.
        if self.seen.len() > 4096 {
            let window = self.window;
            self.seen.retain(|_, (at, _)| at.elapsed() <= window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_serves_cached_replies_within_the_window() {
        let guard = DuplicateGuard::new(60_000);
        let game = GameId(1);
        assert!(guard.check(game, PlayerId(2), "join", 7).is_none());
        guard.record(game, PlayerId(2), "join", 7, IntentReply::Ok);
        assert_eq!(guard.check(game, PlayerId(2), "join", 7), Some(IntentReply::Ok));
        // A different sequence number is a fresh intent.
        assert!(guard.check(game, PlayerId(2), "join", 8).is_none());
    }

    #[test]
    fn guard_forgets_outside_the_window() {
        let guard = DuplicateGuard::new(0);
        guard.record(GameId(1), PlayerId(2), "join", 7, IntentReply::Ok);
        std::thread::sleep(Duration::from_millis(5));
        assert!(guard.check(GameId(1), PlayerId(2), "join", 7).is_none());
    }
}
