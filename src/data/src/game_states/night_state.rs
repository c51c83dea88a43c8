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

/// Per-night scratch state, cleared by the night resolver at dawn.
///
/// The Salvateur's previous target survives the clear as `last_protected` so
/// the no-repeat rule can be enforced the following night.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightState {
    /// Player chosen by the wolves' pack vote, if it has resolved.
    pub victim: Option<PlayerId>,

    /// True once the Witch has spent her life potion on tonight's victim.
    pub witch_save: bool,

    /// Additional kill from the Witch's death potion.
    pub witch_kill_target: Option<PlayerId>,

    /// The Salvateur's shield for tonight.
    pub protected: Option<PlayerId>,

    /// The Salvateur's shield from the previous night. Protecting the same
    /// player twice in a row is illegal.
    pub last_protected: Option<PlayerId>,

    /// Audit rows for role actions taken tonight. Idempotent by
    /// `(day, kind, actor)`.
    pub actions: Vec<NightAction>,
}

impl NightState {
    /// Records an action for the audit trail, overwriting any previous
    /// action with the same `(day, kind, actor)` key.
    pub fn record(&mut self, action: NightAction) {
        if let Some(existing) = self
            .actions
            .iter_mut()
            .find(|a| a.day == action.day && a.kind == action.kind && a.actor == action.actor)
        {
            *existing = action;
        } else {
            self.actions.push(action);
        }
    }
}

/// A single role-scoped night action, kept for audit and recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightAction {
    pub day: u32,
    pub kind: NightActionKind,
    pub actor: PlayerId,
    pub target: Option<PlayerId>,
    pub created_at_unix_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightActionKind {
    Kill,
    Save,
    Poison,
    Protect,
    See,
    Steal,
    Spy,
    Love,
}

impl NightActionKind {
    /// Stable single-byte store encoding, part of the night-action
    /// primary key.
    pub fn to_key(self) -> u8 {
        match self {
            NightActionKind::Kill => 0,
            NightActionKind::Save => 1,
            NightActionKind::Poison => 2,
            NightActionKind::Protect => 3,
            NightActionKind::See => 4,
            NightActionKind::Steal => 5,
            NightActionKind::Spy => 6,
            NightActionKind::Love => 7,
        }
    }
}

/// The Witch's remaining potions. Each may be used once per game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WitchPotions {
    pub life: bool,
    pub death: bool,
}

impl Default for WitchPotions {
    fn default() -> Self {
        Self { life: true, death: true }
    }
}
