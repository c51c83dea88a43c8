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

use std::time::Duration;

use dashmap::DashMap;
use data::core::primitives::GameId;
use data::game_states::timer_state::ActiveTimer;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::game_actor::{GameHandle, GameMessage};

/// Materializes each game's single persisted deadline as a tokio sleep.
///
/// The service never touches game state: an expiring timer posts a
/// [GameMessage::TimerFired] to the game's mailbox and the actor takes it
/// from there. Arming a new deadline for a game cancels its predecessor, so
/// at most one task exists per game.
#[derive(Default)]
pub struct TimerService {
    tasks: DashMap<GameId, ArmedTimer>,
}

struct ArmedTimer {
    epoch: u64,
    task: JoinHandle<()>,
}

impl Drop for ArmedTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TimerService {
    /// Brings the armed task in line with the game's persisted
    /// `active_timer` after a commit.
    pub fn sync(
        &self,
        game_id: GameId,
        timer: Option<ActiveTimer>,
        mailbox: GameHandle,
        now_unix_ms: u64,
    ) {
        match timer {
            None => {
                self.cancel(game_id);
            }
            Some(timer) => {
                if let Some(existing) = self.tasks.get(&game_id) {
                    if existing.epoch == timer.epoch {
                        return;
                    }
                }
                let delay = Duration::from_millis(timer.remaining_ms(now_unix_ms));
                trace!(?game_id, epoch = timer.epoch, ?delay, "Arming timer");
                let epoch = timer.epoch;
                let task = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = mailbox.send(GameMessage::TimerFired { epoch }).await;
                });
                self.tasks.insert(game_id, ArmedTimer { epoch, task });
            }
        }
    }

    /// Cancellation is idempotent.
    pub fn cancel(&self, game_id: GameId) {
        self.tasks.remove(&game_id);
    }

    pub fn cancel_all(&self) {
        self.tasks.clear();
    }
}
