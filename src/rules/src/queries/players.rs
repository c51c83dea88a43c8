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
use data::game_states::game_state::GameState;

/// Ids of all living players, in join order.
pub fn alive_ids(game: &GameState) -> Vec<PlayerId> {
    game.alive_players().map(|p| p.id).collect()
}

/// Ids of all living wolf-aligned players, in join order.
pub fn alive_wolf_ids(game: &GameState) -> Vec<PlayerId> {
    game.alive_wolves().map(|p| p.id).collect()
}

pub fn alive_wolf_count(game: &GameState) -> usize {
    game.alive_wolves().count()
}

pub fn alive_non_wolf_count(game: &GameState) -> usize {
    game.alive_players().filter(|p| !p.is_wolf()).count()
}

/// Whether the living bearer of `role` can currently use their power.
///
/// Village-aligned powers are dead once the village has lynched the Ancien;
/// the wolves' pack kill is unaffected.
pub fn role_power_active(game: &GameState, role: Role) -> bool {
    if game.village_roles_powerless && role.is_village_power() {
        return false;
    }
    game.alive_with_role(role).is_some()
}

/// Whether every player in `ids` is a fake (test) participant.
pub fn all_fake(game: &GameState, ids: &[PlayerId]) -> bool {
    !ids.is_empty()
        && ids.iter().all(|id| game.player(*id).is_some_and(|p| p.fake))
}
