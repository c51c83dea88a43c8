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

use std::collections::HashMap;

use data::core::primitives::PlayerId;
use data::core::roles::Role;
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase::Phase;
use data::player_states::player_state::PlayerState;
use rand::seq::SliceRandom;
use tracing::info;
use utils::outcome::{Outcome, Reject, OK};
use utils::require;

use crate::queries::players;
use crate::steps::step;

pub fn join(
    game: &mut GameState,
    actor: PlayerId,
    username: &str,
    fake: bool,
) -> Outcome {
    require!(game.phase == Phase::Lobby, Reject::LobbyClosed);
    require!(game.player(actor).is_none(), Reject::AlreadyJoined);
    require!(game.players.len() < game.rules.max_players, Reject::LobbyFull);

    let mut player = PlayerState::new(actor, username, game.now_unix_ms);
    player.fake = fake;
    game.players.push(player);
    game.log_action(format!("{username} joined the lobby"));
    game.push_event(GameEvent::LobbyUpdated { players: all_ids(game) });
    OK
}

pub fn leave(game: &mut GameState, actor: PlayerId) -> Outcome {
    require!(game.phase == Phase::Lobby, Reject::LobbyClosed);
    require!(game.player(actor).is_some(), Reject::NotInGame);

    let username = game.player(actor).map(|p| p.username.clone()).unwrap_or_default();
    game.players.retain(|p| p.id != actor);
    game.log_action(format!("{username} left the lobby"));
    game.push_event(GameEvent::LobbyUpdated { players: all_ids(game) });
    OK
}

/// Deals the role pool and enters the first night.
///
/// The pool must hold exactly one role per player, or two extra when it
/// contains the Thief; the surplus pair becomes his night-one offer. Roles
/// are shuffled with the game's own deterministic generator.
pub fn start(game: &mut GameState, actor: PlayerId, role_pool: &[Role]) -> Outcome {
    require!(game.phase == Phase::Lobby, Reject::LobbyClosed);
    require!(game.player(actor).is_some(), Reject::NotInGame);
    require!(game.players.len() >= game.rules.min_players, Reject::NotEnoughPlayers);
    validate_pool(game, role_pool)?;

    let mut pool = role_pool.to_vec();
    let mut rng = game.rng.clone();
    pool.shuffle(&mut rng);
    game.rng = rng;

    for index in 0..game.players.len() {
        game.players[index].role = Some(pool[index]);
    }
    game.thief_extra_roles = pool.split_off(game.players.len());
    // The shuffle may have dealt the Thief card into the leftovers; with no
    // Thief at the table the offer is void.
    if game.alive_with_role(Role::Thief).is_none() {
        game.thief_extra_roles.clear();
    }

    game.started_at_unix_ms = Some(game.now_unix_ms);
    info!(game_id = ?game.id, players = game.players.len(), "Game started");
    game.log_action("The game has started");
    game.push_event(GameEvent::GameStarted { players: all_ids(game) });
    step::begin_first_night(game)
}

fn validate_pool(game: &GameState, role_pool: &[Role]) -> Outcome {
    let has_thief = role_pool.contains(&Role::Thief);
    let expected = if has_thief { game.players.len() + 2 } else { game.players.len() };
    require!(role_pool.len() == expected, Reject::BadRolePool);
    require!(role_pool.iter().any(|role| role.is_wolf()), Reject::BadRolePool);

    let mut counts: HashMap<Role, usize> = HashMap::new();
    for &role in role_pool {
        *counts.entry(role).or_default() += 1;
    }
    require!(
        counts.iter().all(|(role, &count)| count == 1 || !role.unique()),
        Reject::BadRolePool
    );
    OK
}

fn all_ids(game: &GameState) -> Vec<PlayerId> {
    players::alive_ids(game)
}
