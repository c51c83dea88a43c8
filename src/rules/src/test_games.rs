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

//! Builders for hand-assembled games with known role assignments, bypassing
//! the shuffled deal.

use data::config::{EngineConfig, GameRules};
use data::core::primitives::{GameId, GuildId, PlayerId};
use data::core::roles::Role;
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::player_states::player_state::PlayerState;

use crate::steps::step;

/// A lobby-phase game whose players already hold the given roles.
pub fn with_roles(roles: &[(u64, Role)]) -> GameState {
    let mut game = GameState::new(
        GameId(100),
        GuildId(1),
        GameRules::builder().min_players(3).build(),
        &EngineConfig::default(),
        1_000,
    );
    for &(id, role) in roles {
        let mut player = PlayerState::new(PlayerId(id), format!("p{id}"), 1_000);
        player.role = Some(role);
        game.players.push(player);
    }
    game
}

/// Same, but advanced into the first night.
pub fn started(roles: &[(u64, Role)]) -> GameState {
    let mut game = with_roles(roles);
    step::begin_first_night(&mut game).unwrap();
    game.pending_events.clear();
    game
}

pub fn kill_events(game: &GameState) -> Vec<&GameEvent> {
    game.pending_events
        .iter()
        .filter(|event| matches!(event, GameEvent::PlayerKilled { .. }))
        .collect()
}
