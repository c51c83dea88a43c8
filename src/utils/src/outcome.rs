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

use std::fmt;

use color_eyre::Report;
use serde::{Deserialize, Serialize};

/// Reasons an intent is refused before any state change occurs.
///
/// Rejections are user-caused and routine: they produce no journal entry, no
/// store write and no events, and are surfaced verbatim to presenters as
/// snake_case codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reject {
    NotInGame,
    NotDay,
    NotNight,
    WrongPhase,
    WrongSubPhase,
    NotRole,
    ActorDead,
    TargetDead,
    TargetNotFound,
    CaptainAlready,
    NoVictimTonight,
    NoLifePotion,
    NoDeathPotion,
    CannotProtectSelf,
    CannotProtectSame,
    CannotPoisonSelf,
    PowersLost,
    MustTakeWolf,
    InvalidChoice,
    CannotTargetWolf,
    CannotTargetSelf,
    LobbyFull,
    LobbyClosed,
    AlreadyJoined,
    NotEnoughPlayers,
    BadRolePool,
    GameExists,
    DuplicateIntent,
    Busy,
    StorageUnavailable,
}

impl Reject {
    /// The stable wire code for this rejection.
    pub fn code(self) -> &'static str {
        match self {
            Reject::NotInGame => "not_in_game",
            Reject::NotDay => "not_day",
            Reject::NotNight => "not_night",
            Reject::WrongPhase => "wrong_phase",
            Reject::WrongSubPhase => "wrong_sub_phase",
            Reject::NotRole => "not_role",
            Reject::ActorDead => "actor_dead",
            Reject::TargetDead => "target_dead",
            Reject::TargetNotFound => "target_not_found",
            Reject::CaptainAlready => "captain_already",
            Reject::NoVictimTonight => "no_victim_tonight",
            Reject::NoLifePotion => "no_life_potion",
            Reject::NoDeathPotion => "no_death_potion",
            Reject::CannotProtectSelf => "cannot_protect_self",
            Reject::CannotProtectSame => "cannot_protect_same",
            Reject::CannotPoisonSelf => "cannot_poison_self",
            Reject::PowersLost => "powers_lost",
            Reject::MustTakeWolf => "must_take_wolf",
            Reject::InvalidChoice => "invalid_choice",
            Reject::CannotTargetWolf => "cannot_target_wolf",
            Reject::CannotTargetSelf => "cannot_target_self",
            Reject::LobbyFull => "lobby_full",
            Reject::LobbyClosed => "lobby_closed",
            Reject::AlreadyJoined => "already_joined",
            Reject::NotEnoughPlayers => "not_enough_players",
            Reject::BadRolePool => "bad_role_pool",
            Reject::GameExists => "game_exists",
            Reject::DuplicateIntent => "duplicate_intent",
            Reject::Busy => "busy",
            Reject::StorageUnavailable => "storage_unavailable",
        }
    }
}

impl fmt::Display for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Possible reasons why the engine should halt the current mutation.
#[derive(Debug)]
#[must_use]
pub enum StopCondition {
    /// The intent failed a precondition. Routine, user-caused, no state
    /// change happened.
    Reject(Reject),
    /// The mutation discovered a satisfied victory predicate; the game is
    /// over and the scheduler should short-circuit to ENDED.
    GameOver,
    /// A bug-grade internal failure. The working copy is abandoned and the
    /// prior state preserved.
    Error(Report),
}

/// Represents the result of some game mutation.
///
/// The "outcome" system is a wrapper around [Result] that adds additional
/// cases where the engine should halt, but which are not necessarily
/// traditional errors. The [StopCondition] enum describes these in more
/// detail.
pub type Outcome = Result<(), StopCondition>;

/// Equivalent alias to [Outcome] which wraps a returned value
pub type Value<T> = Result<T, StopCondition>;

/// Mutation completed successfully, execution can continue
pub const OK: Outcome = Ok(());

/// Mutation resulted in the game being over, execution should halt.
pub const GAME_OVER: Outcome = Err(StopCondition::GameOver);

impl From<Report> for StopCondition {
    fn from(report: Report) -> Self {
        StopCondition::Error(report)
    }
}

impl StopCondition {
    /// Returns the rejection code if this stop is a routine precondition
    /// failure.
    pub fn as_reject(&self) -> Option<Reject> {
        match self {
            StopCondition::Reject(reject) => Some(*reject),
            _ => None,
        }
    }
}
