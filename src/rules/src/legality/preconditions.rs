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

//! Shared precondition checks. All of these reject (returning a tagged
//! [Reject] code) without touching state; handlers run them before any
//! mutation.

use data::core::primitives::PlayerId;
use data::core::roles::Role;
use data::game_states::game_state::GameState;
use data::game_states::phase::{DayStep, NightStep, Phase, SubPhase};
use utils::outcome::{Outcome, Reject, OK};
use utils::{reject, require};

pub fn expect_night_step(game: &GameState, step: NightStep) -> Outcome {
    require!(game.phase == Phase::Night, Reject::NotNight);
    require!(game.sub_phase == SubPhase::Night(step), Reject::WrongSubPhase);
    OK
}

pub fn expect_day_step(game: &GameState, step: DayStep) -> Outcome {
    require!(game.phase == Phase::Day, Reject::NotDay);
    require!(game.sub_phase == SubPhase::Day(step), Reject::WrongSubPhase);
    OK
}

pub fn expect_actor_alive(game: &GameState, actor: PlayerId) -> Outcome {
    let Some(player) = game.player(actor) else { reject!(Reject::NotInGame) };
    require!(player.alive, Reject::ActorDead);
    OK
}

/// The actor must hold `role`; a village-aligned power additionally requires
/// that the village has not lost its role powers.
pub fn expect_role(game: &GameState, actor: PlayerId, role: Role) -> Outcome {
    require!(game.player(actor).is_some_and(|p| p.has_role(role)), Reject::NotRole);
    if role.is_village_power() {
        require!(!game.village_roles_powerless, Reject::PowersLost);
    }
    OK
}

pub fn expect_target_alive(game: &GameState, target: PlayerId) -> Outcome {
    let Some(player) = game.player(target) else { reject!(Reject::TargetNotFound) };
    require!(player.alive, Reject::TargetDead);
    OK
}
