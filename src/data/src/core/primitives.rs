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

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Unique identifier for a game.
///
/// In practice this is the id of the match's main ("village") chat channel,
/// assigned by the hosting platform. The engine treats it as opaque.
#[derive(
    Debug, Display, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct GameId(pub u64);

/// Unique identifier for a participant.
///
/// A 'player' only exists within the context of one game; the same platform
/// user may be a player in several concurrent games.
#[derive(
    Debug, Display, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct PlayerId(pub u64);

/// Opaque tenant identifier assigned by the hosting platform.
#[derive(
    Debug, Display, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct GuildId(pub u64);

/// Identifier of a chat channel provisioned for a game.
///
/// Games are addressable both by [GameId] and by any of their secondary
/// channels (wolves' den, witch's hut, ...) through the registry's reverse
/// index.
#[derive(
    Debug, Display, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct ChannelId(pub u64);

/// Identifies a struct that is 1:1 associated with a given [PlayerId].
pub trait HasPlayerId {
    fn player_id(&self) -> PlayerId;
}

impl HasPlayerId for PlayerId {
    fn player_id(&self) -> PlayerId {
        *self
    }
}

impl GameId {
    /// Big-endian key encoding used by the persistent store.
    pub fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}
