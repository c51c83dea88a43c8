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
use data::events::{DeathCause, GameEvent};
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::{fail, verify};

/// Kills `target`, applying the death's knock-on effects:
///
/// - a lover dies of heartbreak alongside their partner,
/// - a dead Hunter is queued for his parting shot,
/// - the village eliminating the Ancien disables all village role powers,
/// - a dead captain leaves the seat empty (there is no succession).
///
/// Victory is NOT evaluated here; callers check it once the full cascade has
/// been applied.
pub fn kill(game: &mut GameState, target: PlayerId, cause: DeathCause) -> Outcome {
    let Some(player) = game.player_mut(target) else {
        fail!("killing unknown player {target:?}")
    };
    verify!(player.alive, "killing already-dead player {target:?}");

    player.alive = false;
    let role = player.role;
    let username = player.username.clone();
    game.dead.push(target);

    let Some(role) = role else { fail!("player {target:?} died without a role") };

    game.push_event(GameEvent::PlayerKilled { player: target, role, cause });
    game.log_action(format!("{username} died ({role:?})"));

    if role == Role::Ancien && matches!(cause, DeathCause::Lynch | DeathCause::WitchPoison) {
        game.village_roles_powerless = true;
        game.log_action("The village has slain the Ancien; its role powers are lost");
    }

    if game.captain == Some(target) {
        game.captain = None;
    }

    if role == Role::Hunter {
        game.pending_hunters.push(target);
    }

    if let Some(partner) = game.lover_of(target) {
        if game.player(partner).is_some_and(|p| p.alive) {
            kill(game, partner, DeathCause::Heartbreak)?;
        }
    }

    OK
}
