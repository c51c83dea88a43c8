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

use crate::core::primitives::{GameId, PlayerId};
use crate::core::roles::{Camp, Role};
use crate::game_states::history::LogEntry;
use crate::game_states::phase::{Phase, SubPhase};
use crate::game_states::vote_state::VoteKind;

/// Why a player died.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Wolves,
    WitchPoison,
    Lynch,
    /// Died of grief when their lover was killed.
    Heartbreak,
    HunterShot,
    Forced,
}

/// Outcome of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    pub camp: Camp,
    pub winners: Vec<PlayerId>,
}

/// The typed event stream consumed by presentation adapters.
///
/// Delivery is best-effort: the engine never blocks on a subscriber, and a
/// slow subscriber drops events from the tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum GameEvent {
    LobbyUpdated { players: Vec<PlayerId> },
    GameStarted { players: Vec<PlayerId> },
    PhaseChanged { phase: Phase, day: u32 },
    SubPhaseChanged { sub_phase: SubPhase },
    VoteCast { kind: VoteKind, voter: PlayerId, candidate: PlayerId },
    VoteCompleted { kind: VoteKind, winner: Option<PlayerId>, was_tie: bool, tally: Vec<(PlayerId, u32)> },
    CaptainElected { captain: PlayerId },
    PlayerKilled { player: PlayerId, role: Role, cause: DeathCause },
    PlayerRoleChanged { player: PlayerId, role: Role },
    NightResolved { day: u32, deaths: Vec<PlayerId> },
    GameEnded { victory: Victory },
    ActionLog { entry: LogEntry },
    /// Private reveal for the Seer. Presenters must deliver this only to
    /// `seer`.
    SeerVision { seer: PlayerId, target: PlayerId, role: Role },
    /// Private reveal for the Petite Fille.
    SpyReport { spy: PlayerId, wolves: Vec<PlayerId> },
    /// Coalesced "refresh panels" signal: at most one per game per dispatch
    /// turn, derived from the display-relevant events of that turn.
    PanelsRefresh,
}

impl GameEvent {
    /// Events that should additionally schedule a coalesced panel refresh.
    pub fn refreshes_panels(&self) -> bool {
        matches!(
            self,
            GameEvent::PhaseChanged { .. }
                | GameEvent::SubPhaseChanged { .. }
                | GameEvent::PlayerKilled { .. }
                | GameEvent::GameEnded { .. }
                | GameEvent::GameStarted { .. }
                | GameEvent::VoteCompleted { .. }
                | GameEvent::CaptainElected { .. }
        )
    }
}

/// An event stamped with its game and wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub game_id: GameId,
    pub at_unix_ms: u64,
    pub event: GameEvent,
}
