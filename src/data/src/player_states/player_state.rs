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

use crate::core::primitives::PlayerId;
use crate::core::roles::Role;

/// State for one participant within a game.
///
/// Cross-references between players (lovers, votes, kill targets) are always
/// by [PlayerId]; the game owns the single `Vec<PlayerState>` arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub username: String,

    /// None only while the game is in LOBBY.
    pub role: Option<Role>,

    pub alive: bool,

    /// Set by Cupid on night one.
    pub in_love: bool,

    /// A lynched Idiot survives revealed, but his future lynch ballots
    /// carry weight zero.
    pub idiot_revealed: bool,

    /// A role may change at most once per game, via the Thief swap.
    pub role_changed: bool,

    /// Non-human test participant; see `skip_fake_phases`.
    pub fake: bool,

    pub joined_at_unix_ms: u64,
}

impl PlayerState {
    pub fn new(id: PlayerId, username: impl Into<String>, joined_at_unix_ms: u64) -> Self {
        Self {
            id,
            username: username.into(),
            role: None,
            alive: true,
            in_love: false,
            idiot_revealed: false,
            role_changed: false,
            fake: false,
            joined_at_unix_ms,
        }
    }

    pub fn is_wolf(&self) -> bool {
        self.role.is_some_and(Role::is_wolf)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}
