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

use data::core::roles::Camp;
use data::events::{GameEvent, Victory};
use data::game_states::game_state::GameState;
use data::game_states::phase::{Phase, SubPhase};
use utils::outcome::{Outcome, GAME_OVER, OK};

use crate::queries::victory;

/// Transitions the game to ENDED with the given outcome.
///
/// Returns [GAME_OVER] so enclosing handlers stop scheduling; the mutator
/// still commits the final state.
pub fn apply(game: &mut GameState, victory: Victory) -> Outcome {
    game.clear_timer();
    game.hunter_shoot = None;
    game.pending_hunters.clear();
    game.set_phase(Phase::Ended);
    game.set_sub_phase(SubPhase::Ended);
    game.log_action(format!("Game over: {:?} win", victory.camp));
    game.victory = Some(victory.clone());
    game.push_event(GameEvent::GameEnded { victory });
    GAME_OVER
}

/// Ends the game if a victory predicate is satisfied; otherwise continues.
pub fn check(game: &mut GameState) -> Outcome {
    match victory::evaluate(game) {
        Some(victory) => apply(game, victory),
        None => OK,
    }
}

/// Administrative teardown: ends the game with no winner.
pub fn abort(game: &mut GameState) -> Outcome {
    apply(game, Victory { camp: Camp::Nobody, winners: Vec::new() })
}
