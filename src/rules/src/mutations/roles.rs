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

use data::core::primitives::PlayerId;
use data::core::roles::Role;
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::{fail, verify};

/// Swaps `player`'s role. A role changes at most once per game, and only
/// through the Thief; this is enforced here, not at the call sites.
pub fn swap(game: &mut GameState, player: PlayerId, role: Role) -> Outcome {
    let Some(state) = game.player_mut(player) else {
        fail!("swapping role of unknown player {player:?}")
    };
    verify!(!state.role_changed, "role of {player:?} already changed once");

    state.role = Some(role);
    state.role_changed = true;
    let username = state.username.clone();

    game.push_event(GameEvent::PlayerRoleChanged { player, role });
    game.log_action(format!("{username} now holds {role:?}"));
    OK
}
