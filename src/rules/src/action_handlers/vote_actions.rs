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
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase::DayStep;
use data::game_states::vote_state::VoteKind;
use utils::outcome::{Outcome, Reject};
use utils::{fail, require};

use crate::legality::preconditions;
use crate::steps::step;

/// Ballot in the first-day captain election. Abstaining is simply not
/// voting; there is no explicit abstain verb.
pub fn captain_vote(game: &mut GameState, actor: PlayerId, candidate: PlayerId) -> Outcome {
    preconditions::expect_day_step(game, DayStep::VoteCapitaine)?;
    preconditions::expect_actor_alive(game, actor)?;
    require!(game.captain.is_none(), Reject::CaptainAlready);
    preconditions::expect_target_alive(game, candidate)?;

    let Some(ballots) = game.votes.get_mut(VoteKind::Captain) else {
        fail!("captain ballot box missing during VOTE_CAPITAINE")
    };
    ballots.cast(actor, candidate);
    game.push_event(GameEvent::VoteCast {
        kind: VoteKind::Captain,
        voter: actor,
        candidate,
    });
    step::captain_ballot_cast(game)
}

/// Ballot in the day lynch vote. A revealed Idiot may still vote; his
/// ballot just weighs nothing at the tally.
pub fn day_vote(game: &mut GameState, actor: PlayerId, candidate: PlayerId) -> Outcome {
    preconditions::expect_day_step(game, DayStep::Vote)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_target_alive(game, candidate)?;

    let Some(ballots) = game.votes.get_mut(VoteKind::Lynch) else {
        fail!("lynch ballot box missing during VOTE")
    };
    ballots.cast(actor, candidate);
    game.push_event(GameEvent::VoteCast { kind: VoteKind::Lynch, voter: actor, candidate });
    step::lynch_ballot_cast(game)
}
