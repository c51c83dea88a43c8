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

use enum_iterator::Sequence;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};

/// The closed set of roles a player can hold.
///
/// A player's role is assigned at game start and changes at most once per
/// game, via the Thief's swap.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Sequence, Ord, PartialOrd)]
pub enum Role {
    Werewolf,
    WhiteWolf,
    Villager,
    Seer,
    Witch,
    Hunter,
    PetiteFille,
    Cupid,
    Salvateur,
    Ancien,
    Thief,
    Idiot,
}

impl Role {
    /// Wolf-aligned roles vote in the pack and count toward the wolves'
    /// victory predicate.
    pub fn is_wolf(self) -> bool {
        matches!(self, Role::Werewolf | Role::WhiteWolf)
    }

    /// Village-aligned roles whose night/passive powers are disabled once the
    /// village has lynched the Ancien.
    ///
    /// Wolves keep their pack kill regardless.
    pub fn is_village_power(self) -> bool {
        matches!(
            self,
            Role::Seer
                | Role::Witch
                | Role::Hunter
                | Role::PetiteFille
                | Role::Cupid
                | Role::Salvateur
                | Role::Ancien
                | Role::Idiot
        )
    }

    /// Roles that may appear at most once in a role pool.
    pub fn unique(self) -> bool {
        !matches!(self, Role::Werewolf | Role::Villager)
    }
}

/// The camps a finished game can be awarded to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Camp {
    Village,
    Wolves,
    Lovers,
    WhiteWolf,
    /// An aborted game has no winner.
    Nobody,
}
