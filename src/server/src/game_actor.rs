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

use data::actions::intent::{ActorRef, IntentVerb};
use data::core::primitives::GameId;
use data::game_states::game_state::GameChannels;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::atomic;
use crate::engine::{EngineShared, IntentReply};

/// Messages a game's actor processes, strictly in arrival order.
///
/// The actor is the game's single writer: intents, timer fires and
/// provisioning all funnel through its mailbox, which is what serializes
/// every mutation of one game while games stay parallel to each other.
#[derive(Debug)]
pub enum GameMessage {
    Intent {
        actor: ActorRef,
        verb: IntentVerb,
        reply: oneshot::Sender<IntentReply>,
    },
    /// A timer fired for the arm generation `epoch`. Stale generations are
    /// ignored, which makes late fires harmless.
    TimerFired { epoch: u64 },
    Provision {
        channels: GameChannels,
        reply: oneshot::Sender<IntentReply>,
    },
}

/// Cloneable mailbox address of one game's actor.
#[derive(Debug, Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameMessage>,
}

const MAILBOX_CAPACITY: usize = 64;

impl GameHandle {
    /// Enqueues without waiting; a full mailbox fails fast with `Busy`.
    pub fn try_send(&self, message: GameMessage) -> Result<(), GameMessage> {
        self.sender.try_send(message).map_err(|error| match error {
            mpsc::error::TrySendError::Full(message)
            | mpsc::error::TrySendError::Closed(message) => message,
        })
    }

    pub async fn send(&self, message: GameMessage) -> bool {
        self.sender.send(message).await.is_ok()
    }
}

/// Spawns the single-writer actor for `game_id`.
pub fn spawn(shared: Arc<EngineShared>, game_id: GameId) -> (GameHandle, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel(MAILBOX_CAPACITY);
    let handle = GameHandle { sender };

    let join = tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            match message {
                GameMessage::Intent { actor, verb, reply } => {
                    let result = atomic::run_intent(&shared, game_id, actor, &verb).await;
                    let _ = reply.send(result);
                }
                GameMessage::TimerFired { epoch } => {
                    atomic::run_timeout(&shared, game_id, epoch).await;
                }
                GameMessage::Provision { channels, reply } => {
                    let result = atomic::run_provision(&shared, game_id, channels).await;
                    let _ = reply.send(result);
                }
            }
            // Teardown drops the registry entry; the actor follows.
            if !shared.registry.contains(game_id) {
                break;
            }
        }
        debug!(?game_id, "Game actor stopped");
    });

    (handle, join)
}
