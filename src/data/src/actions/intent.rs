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

use serde::{Deserialize, Serialize};

use crate::actions::admin_action::AdminAction;
use crate::actions::game_action::GameAction;
use crate::actions::lobby_action::LobbyAction;
use crate::core::primitives::{ChannelId, GameId, PlayerId};

/// How an intent addresses its game: directly, or through any channel
/// provisioned for it (the registry resolves the reverse index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameRef {
    Game(GameId),
    Channel(ChannelId),
}

/// The submitting user, as the presentation layer authenticated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: PlayerId,
    /// Grants [AdminAction]s. Assigned by the host, opaque to the engine.
    pub admin: bool,
}

/// Any verb the engine dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IntentVerb {
    Lobby(LobbyAction),
    Game(GameAction),
    Admin(AdminAction),
}

impl IntentVerb {
    pub fn name(&self) -> &'static str {
        match self {
            IntentVerb::Lobby(action) => action.name(),
            IntentVerb::Game(action) => action.name(),
            IntentVerb::Admin(action) => action.name(),
        }
    }
}

/// The structured request presenters submit to the engine.
///
/// `client_seq` feeds the duplicate-intent guard: a re-submission with the
/// same `(verb, game, actor)` inside the configured window is answered from
/// the original result instead of being re-applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub game: GameRef,
    pub actor: ActorRef,
    pub verb: IntentVerb,
    pub client_seq: Option<u64>,
}

impl Intent {
    pub fn new(game: GameRef, actor: ActorRef, verb: IntentVerb) -> Self {
        Self { game, actor, verb, client_seq: None }
    }
}
