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

/// Which of the two leftover roles the Thief takes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum StealChoice {
    First,
    Second,
}

impl StealChoice {
    /// Parses the 1-based choice presenters collect from users.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(StealChoice::First),
            2 => Some(StealChoice::Second),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            StealChoice::First => 0,
            StealChoice::Second => 1,
        }
    }
}

/// The Witch's two potions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Potion {
    /// Saves tonight's wolf victim.
    Life,
    /// Kills the given target, bypassing protection.
    Death { target: PlayerId },
}

/// In-game action verbs, dispatched to role and vote handlers.
///
/// Every variant carries exactly the arguments its handler validates; the
/// envelope around it is [crate::actions::intent::Intent].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "verb", content = "args")]
pub enum GameAction {
    /// A wolf's ballot in the pack vote.
    WolfKill { target: PlayerId },

    /// The Seer inspects a player's current role.
    See { target: PlayerId },

    /// The Witch uses one of her potions.
    UsePotion { potion: Potion },

    /// The Salvateur shields a player for tonight.
    Protect { target: PlayerId },

    /// Cupid designates the lovers. Night one only.
    Love { first: PlayerId, second: PlayerId },

    /// The Petite Fille peeks at the wolves.
    Spy,

    /// The Thief swaps his card for one of the two leftovers.
    Steal { choice: StealChoice },

    /// The Thief declines the swap. Illegal when both leftovers are
    /// wolf-aligned.
    SkipSteal,

    /// The dead Hunter's parting shot.
    HunterShoot { target: PlayerId },

    /// Ballot in the first-day captain election.
    CaptainVote { candidate: PlayerId },

    /// Ballot in the day lynch vote.
    DayVote { candidate: PlayerId },
}

impl GameAction {
    /// Stable verb name, used by the WAL and the duplicate-intent guard.
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::WolfKill { .. } => "wolf_kill",
            GameAction::See { .. } => "see",
            GameAction::UsePotion { .. } => "use_potion",
            GameAction::Protect { .. } => "protect",
            GameAction::Love { .. } => "love",
            GameAction::Spy => "spy",
            GameAction::Steal { .. } => "steal",
            GameAction::SkipSteal => "skip_steal",
            GameAction::HunterShoot { .. } => "hunter_shoot",
            GameAction::CaptainVote { .. } => "captain_vote",
            GameAction::DayVote { .. } => "day_vote",
        }
    }
}
