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

/// Privileged actions. The engine only checks the actor's `admin` flag; who
/// gets that flag is the host's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "verb")]
pub enum AdminAction {
    /// Resolves the current sub-phase exactly as an AFK timeout would.
    SkipSubPhase,
    /// Ends the game normally (no winner is computed).
    EndGame,
    /// Tears the game down immediately.
    ForceEnd,
}

impl AdminAction {
    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::SkipSubPhase => "skip_sub_phase",
            AdminAction::EndGame => "end_game",
            AdminAction::ForceEnd => "force_end",
        }
    }
}
