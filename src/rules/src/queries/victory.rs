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

use data::core::roles::{Camp, Role};
use data::events::Victory;
use data::game_states::game_state::GameState;

use crate::queries::players;

/// Evaluates the victory predicate against the current state.
///
/// Checked after every death cascade and at DUSK. Order matters: the lovers'
/// and White Wolf's solo wins pre-empt the camp wins they would otherwise be
/// folded into.
pub fn evaluate(game: &GameState) -> Option<Victory> {
    let alive = players::alive_ids(game);

    if alive.is_empty() {
        return Some(Victory { camp: Camp::Nobody, winners: Vec::new() });
    }

    if let Some((a, b)) = game.lovers {
        let both_alive = alive.contains(&a) && alive.contains(&b);
        if both_alive && alive.len() == 2 {
            return Some(Victory { camp: Camp::Lovers, winners: vec![a, b] });
        }
    }

    if alive.len() == 1 {
        if let Some(player) = game.player(alive[0]) {
            if player.has_role(Role::WhiteWolf) {
                return Some(Victory { camp: Camp::WhiteWolf, winners: alive });
            }
        }
    }

    let wolves = players::alive_wolf_count(game);
    let villagers = players::alive_non_wolf_count(game);

    if wolves == 0 {
        return Some(Victory { camp: Camp::Village, winners: alive });
    }
    // Parity: the wolves can no longer be outvoted.
    if wolves >= villagers {
        return Some(Victory { camp: Camp::Wolves, winners: players::alive_wolf_ids(game) });
    }

    None
}

#[cfg(test)]
mod tests {
    use data::config::{EngineConfig, GameRules};
    use data::core::primitives::{GameId, GuildId, PlayerId};
    use data::player_states::player_state::PlayerState;

    use super::*;

    fn game_with(alive: &[(u64, Role)], dead: &[(u64, Role)]) -> GameState {
        let mut game = GameState::new(
            GameId(5),
            GuildId(1),
            GameRules::default(),
            &EngineConfig::default(),
            1_000,
        );
        for &(id, role) in alive.iter().chain(dead) {
            let mut player = PlayerState::new(PlayerId(id), format!("p{id}"), 1_000);
            player.role = Some(role);
            player.alive = alive.iter().any(|&(a, _)| a == id);
            if !player.alive {
                game.dead.push(player.id);
            }
            game.players.push(player);
        }
        game
    }

    #[test]
    fn ongoing_game_has_no_winner() {
        let game = game_with(
            &[(1, Role::Werewolf), (2, Role::Villager), (3, Role::Villager)],
            &[],
        );
        assert_eq!(evaluate(&game), None);
    }

    #[test]
    fn village_wins_when_wolves_are_gone() {
        let game = game_with(
            &[(2, Role::Villager), (3, Role::Seer)],
            &[(1, Role::Werewolf)],
        );
        assert_eq!(evaluate(&game).unwrap().camp, Camp::Village);
    }

    #[test]
    fn wolves_win_at_parity() {
        let game = game_with(
            &[(1, Role::Werewolf), (2, Role::Villager)],
            &[(3, Role::Villager)],
        );
        let victory = evaluate(&game).unwrap();
        assert_eq!(victory.camp, Camp::Wolves);
        assert_eq!(victory.winners, vec![PlayerId(1)]);
    }

    #[test]
    fn lovers_alone_together_beat_their_camps() {
        let mut game = game_with(
            &[(1, Role::Werewolf), (2, Role::Villager)],
            &[(3, Role::Villager)],
        );
        game.lovers = Some((PlayerId(1), PlayerId(2)));
        let victory = evaluate(&game).unwrap();
        assert_eq!(victory.camp, Camp::Lovers);
    }

    #[test]
    fn lone_white_wolf_wins_alone() {
        let game = game_with(&[(1, Role::WhiteWolf)], &[(2, Role::Werewolf), (3, Role::Villager)]);
        assert_eq!(evaluate(&game).unwrap().camp, Camp::WhiteWolf);
    }

    #[test]
    fn an_empty_village_is_nobodys_win() {
        let game = game_with(&[], &[(1, Role::Werewolf), (2, Role::Villager)]);
        assert_eq!(evaluate(&game).unwrap().camp, Camp::Nobody);
    }
}
