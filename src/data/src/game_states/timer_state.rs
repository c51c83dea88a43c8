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

use crate::game_states::phase::SubPhase;

/// The kinds of deadline a game can be waiting on.
///
/// At most one timer is armed per game; arming a new one cancels the
/// predecessor.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// AFK timeout for the given sub-phase: on expiry the sub-phase is
    /// resolved with whatever partial information was collected.
    SubPhase(SubPhase),
}

/// The game's single armed deadline, persisted so recovery can re-arm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTimer {
    pub kind: TimerKind,
    /// Wall-clock expiry. Recovery re-derives the remaining duration from
    /// this; an already-elapsed deadline fires immediately.
    pub deadline_unix_ms: u64,
    pub total_ms: u64,
    /// Arm generation. Late fires carrying a stale epoch are ignored.
    pub epoch: u64,
}

impl ActiveTimer {
    pub fn remaining_ms(&self, now_unix_ms: u64) -> u64 {
        self.deadline_unix_ms.saturating_sub(now_unix_ms)
    }
}
