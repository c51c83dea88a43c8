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
use serde::{Deserialize, Serialize};

/// Top-level phase of a game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    Night,
    Day,
    Ended,
}

/// Ordered sub-phases of NIGHT.
///
/// The scheduler advances through these in declaration order via
/// `enum_iterator::next`, auto-skipping steps whose required role is absent,
/// dead, or powerless. The night-1-only steps are skipped on later nights.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Sequence,
)]
pub enum NightStep {
    /// Cupid designates the lovers. First night only.
    Cupid,
    /// The lovers learn of each other. First night only.
    LoversReveal,
    /// The Thief picks one of the two leftover roles. First night only.
    Thief,
    /// The Salvateur shields one player from the wolves.
    Salvateur,
    /// The wolves' pack vote for tonight's victim.
    Loups,
    /// The Witch may use her potions.
    Sorciere,
    /// The Seer inspects one player's role.
    Voyante,
    /// The Petite Fille spies on the wolves.
    PetiteFille,
    /// Transition step: night resolution runs, then dawn breaks.
    Reveil,
}

/// Ordered sub-phases of DAY.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Sequence,
)]
pub enum DayStep {
    /// The night's deaths are announced.
    Dawn,
    /// First-day captain election, only while no captain exists.
    VoteCapitaine,
    /// Open discussion.
    Deliberation,
    /// The lynch vote.
    Vote,
    /// Transition step: tallies are cleared and night falls.
    Dusk,
}

/// Fine-grained state within the current [Phase].
///
/// `HunterShoot` is a transient sub-phase opened out-of-band when a Hunter
/// dies; it is legal during both NIGHT and DAY and returns to the regular
/// schedule once the shot lands.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SubPhase {
    Lobby,
    Night(NightStep),
    Day(DayStep),
    HunterShoot,
    Ended,
}

impl SubPhase {
    /// Whether this sub-phase may occur during `phase`.
    pub fn legal_in(self, phase: Phase) -> bool {
        match self {
            SubPhase::Lobby => phase == Phase::Lobby,
            SubPhase::Night(_) => phase == Phase::Night,
            SubPhase::Day(_) => phase == Phase::Day,
            SubPhase::HunterShoot => matches!(phase, Phase::Night | Phase::Day),
            SubPhase::Ended => phase == Phase::Ended,
        }
    }

    pub fn night_step(self) -> Option<NightStep> {
        match self {
            SubPhase::Night(step) => Some(step),
            _ => None,
        }
    }

    pub fn day_step(self) -> Option<DayStep> {
        match self {
            SubPhase::Day(step) => Some(step),
            _ => None,
        }
    }
}
