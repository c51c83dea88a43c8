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

use crate::core::roles::Role;

/// Actions available while a game sits in LOBBY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "verb", content = "args")]
pub enum LobbyAction {
    Join {
        username: String,
        /// Marks a non-human test participant.
        #[serde(default)]
        fake: bool,
    },
    Leave,
    /// Deals `role_pool` to the lobby and enters the first night.
    ///
    /// The pool must hold one role per player, or two extra when it contains
    /// the Thief (the surplus pair becomes his night-one offer).
    Start { role_pool: Vec<Role> },
}

impl LobbyAction {
    pub fn name(&self) -> &'static str {
        match self {
            LobbyAction::Join { .. } => "join",
            LobbyAction::Leave => "leave",
            LobbyAction::Start { .. } => "start",
        }
    }
}
