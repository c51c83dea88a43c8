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
use typed_builder::TypedBuilder;

/// How the wolves' pack vote locks in a victim.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WolfWinCondition {
    /// A candidate reaching ⌈N/2⌉ of the alive wolves' ballots wins.
    #[default]
    Majority,
    /// All alive wolves must agree, with at least one ballot cast.
    Elimination,
}

/// Per-game rules, fixed at game creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct GameRules {
    #[builder(default = 5)]
    pub min_players: usize,
    #[builder(default = 10)]
    pub max_players: usize,
    #[builder(default)]
    pub wolf_win_condition: WolfWinCondition,
}

impl Default for GameRules {
    fn default() -> Self {
        Self { min_players: 5, max_players: 10, wolf_win_condition: WolfWinCondition::default() }
    }
}

/// AFK timeout durations, deterministic per sub-phase kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct Timeouts {
    #[builder(default = 90_000)]
    pub night_role_ms: u64,
    #[builder(default = 180_000)]
    pub deliberation_ms: u64,
    #[builder(default = 60_000)]
    pub vote_ms: u64,
    #[builder(default = 60_000)]
    pub captain_vote_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            night_role_ms: 90_000,
            deliberation_ms: 180_000,
            vote_ms: 60_000,
            captain_vote_ms: 60_000,
        }
    }
}

/// Engine-wide configuration, loaded once at boot.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct EngineConfig {
    /// Default rules applied to games created without explicit rules.
    #[builder(default)]
    pub rules: GameRules,

    #[builder(default)]
    pub timeouts: Timeouts,

    /// Auto-skip sub-phases whose only active bearers are non-human
    /// participants. Testing aid.
    #[builder(default = false)]
    pub skip_fake_phases: bool,

    /// Passed through to the external voice adapter, opaque to the engine.
    #[builder(default = false)]
    pub disable_voice_mute: bool,

    /// Window during which a re-submitted `(verb, game, actor)` triple is
    /// answered from the original result.
    #[builder(default = 5_000)]
    pub duplicate_intent_window_ms: u64,

    /// Upper bound on a game's action log before head truncation.
    #[builder(default = 200)]
    pub max_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            timeouts: Timeouts::default(),
            skip_fake_phases: false,
            disable_voice_mute: false,
            duplicate_intent_window_ms: 5_000,
            max_history: 200,
        }
    }
}
