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

//! The static capability table: which role acts in which sub-phase, and
//! which players a sub-phase is waiting on. Roles are a closed tagged union;
//! dispatch goes through this table, never through per-role polymorphism.

use data::core::primitives::PlayerId;
use data::core::roles::Role;
use data::game_states::game_state::GameState;
use data::game_states::phase::{DayStep, NightStep, SubPhase};

use crate::queries::players;

/// The role a night step is gated on, if any.
pub fn acting_role(step: NightStep) -> Option<Role> {
    match step {
        NightStep::Cupid => Some(Role::Cupid),
        NightStep::LoversReveal => None,
        NightStep::Thief => Some(Role::Thief),
        NightStep::Salvateur => Some(Role::Salvateur),
        NightStep::Loups => None,
        NightStep::Sorciere => Some(Role::Witch),
        NightStep::Voyante => Some(Role::Seer),
        NightStep::PetiteFille => Some(Role::PetiteFille),
        NightStep::Reveil => None,
    }
}

/// Whether `step` waits for player input (as opposed to being a transition
/// the scheduler passes straight through).
pub fn is_waiting_step(step: NightStep) -> bool {
    !matches!(step, NightStep::LoversReveal | NightStep::Reveil)
}

/// Whether the scheduler should run `step` tonight. A step whose required
/// role is absent, dead, or powerless is auto-skipped.
pub fn night_step_applicable(game: &GameState, step: NightStep) -> bool {
    let first_night = game.day_count == 0;
    match step {
        NightStep::Cupid => first_night && players::role_power_active(game, Role::Cupid),
        NightStep::LoversReveal => first_night && game.lovers.is_some(),
        NightStep::Thief => {
            first_night
                && players::role_power_active(game, Role::Thief)
                && game.thief_extra_roles.len() == 2
        }
        NightStep::Salvateur => players::role_power_active(game, Role::Salvateur),
        NightStep::Loups => players::alive_wolf_count(game) > 0,
        NightStep::Sorciere => {
            players::role_power_active(game, Role::Witch)
                && (game.witch_potions.life || game.witch_potions.death)
        }
        NightStep::Voyante => players::role_power_active(game, Role::Seer),
        NightStep::PetiteFille => players::role_power_active(game, Role::PetiteFille),
        NightStep::Reveil => true,
    }
}

/// Whether the scheduler should run `step` today.
pub fn day_step_applicable(game: &GameState, step: DayStep) -> bool {
    match step {
        DayStep::Dawn | DayStep::Deliberation | DayStep::Vote | DayStep::Dusk => true,
        DayStep::VoteCapitaine => game.day_count == 1 && game.captain.is_none(),
    }
}

/// The players a waiting sub-phase is blocked on. Used by the all-voted
/// checks and by the fake-participant fast path.
pub fn actors_for(game: &GameState, sub_phase: SubPhase) -> Vec<PlayerId> {
    match sub_phase {
        SubPhase::Night(NightStep::Loups) => players::alive_wolf_ids(game),
        SubPhase::Night(step) => acting_role(step)
            .and_then(|role| game.alive_with_role(role))
            .map(|p| vec![p.id])
            .unwrap_or_default(),
        SubPhase::Day(DayStep::VoteCapitaine)
        | SubPhase::Day(DayStep::Vote)
        | SubPhase::Day(DayStep::Deliberation) => players::alive_ids(game),
        SubPhase::HunterShoot => {
            game.hunter_shoot.map(|state| vec![state.shooter]).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use data::config::{EngineConfig, GameRules};
    use data::core::primitives::{GameId, GuildId};
    use data::player_states::player_state::PlayerState;

    use super::*;

    fn game_of(roles: &[(u64, Role)]) -> GameState {
        let mut game = GameState::new(
            GameId(3),
            GuildId(1),
            GameRules::default(),
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

    #[test]
    fn first_night_only_steps_skip_later() {
        let mut game = game_of(&[(1, Role::Werewolf), (2, Role::Cupid), (3, Role::Thief)]);
        game.thief_extra_roles = vec![Role::Villager, Role::Villager];
        assert!(night_step_applicable(&game, NightStep::Cupid));
        assert!(night_step_applicable(&game, NightStep::Thief));

        game.day_count = 1;
        assert!(!night_step_applicable(&game, NightStep::Cupid));
        assert!(!night_step_applicable(&game, NightStep::Thief));
        assert!(night_step_applicable(&game, NightStep::Loups));
    }

    #[test]
    fn steps_skip_without_their_role() {
        let game = game_of(&[(1, Role::Werewolf), (2, Role::Villager)]);
        assert!(!night_step_applicable(&game, NightStep::Salvateur));
        assert!(!night_step_applicable(&game, NightStep::Voyante));
        assert!(!night_step_applicable(&game, NightStep::Sorciere));
        assert!(night_step_applicable(&game, NightStep::Loups));
        assert!(night_step_applicable(&game, NightStep::Reveil));
    }

    #[test]
    fn powerless_village_skips_its_steps_but_not_the_wolves() {
        let mut game = game_of(&[(1, Role::Werewolf), (2, Role::Seer), (3, Role::Salvateur)]);
        game.day_count = 2;
        assert!(night_step_applicable(&game, NightStep::Voyante));
        game.village_roles_powerless = true;
        assert!(!night_step_applicable(&game, NightStep::Voyante));
        assert!(!night_step_applicable(&game, NightStep::Salvateur));
        assert!(night_step_applicable(&game, NightStep::Loups));
    }

    #[test]
    fn spent_witch_is_skipped() {
        let mut game = game_of(&[(1, Role::Werewolf), (2, Role::Witch)]);
        assert!(night_step_applicable(&game, NightStep::Sorciere));
        game.witch_potions.life = false;
        game.witch_potions.death = false;
        assert!(!night_step_applicable(&game, NightStep::Sorciere));
    }

    #[test]
    fn captain_vote_runs_only_on_the_first_day() {
        let mut game = game_of(&[(1, Role::Werewolf), (2, Role::Villager)]);
        game.day_count = 1;
        assert!(day_step_applicable(&game, DayStep::VoteCapitaine));
        game.captain = Some(PlayerId(2));
        assert!(!day_step_applicable(&game, DayStep::VoteCapitaine));
        game.captain = None;
        game.day_count = 2;
        assert!(!day_step_applicable(&game, DayStep::VoteCapitaine));
    }
}
