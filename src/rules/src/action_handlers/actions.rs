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

use data::actions::admin_action::AdminAction;
use data::actions::game_action::GameAction;
use data::actions::intent::{ActorRef, IntentVerb};
use data::actions::lobby_action::LobbyAction;
use data::game_states::game_state::GameState;
use tracing::{debug, instrument};
use utils::outcome::{Outcome, Reject};
use utils::require;

use crate::action_handlers::{lobby_actions, role_actions, vote_actions};
use crate::mutations::game_end;
use crate::steps::step;

/// Dispatches one validated intent verb into its handler.
///
/// This runs inside an atomic mutation: a rejection unwinds with no state
/// change, success leaves the game in its next waiting state with events
/// queued.
#[instrument(level = "debug", skip(game))]
pub fn execute(game: &mut GameState, actor: ActorRef, verb: &IntentVerb) -> Outcome {
    debug!(game_id = ?game.id, actor = ?actor.id, verb = verb.name(), "Executing intent");
    match verb {
        IntentVerb::Lobby(action) => execute_lobby(game, actor, action),
        IntentVerb::Game(action) => execute_game(game, actor, *action),
        IntentVerb::Admin(action) => execute_admin(game, actor, *action),
    }
}

fn execute_lobby(game: &mut GameState, actor: ActorRef, action: &LobbyAction) -> Outcome {
    match action {
        LobbyAction::Join { username, fake } => {
            lobby_actions::join(game, actor.id, username, *fake)
        }
        LobbyAction::Leave => lobby_actions::leave(game, actor.id),
        LobbyAction::Start { role_pool } => lobby_actions::start(game, actor.id, role_pool),
    }
}

fn execute_game(game: &mut GameState, actor: ActorRef, action: GameAction) -> Outcome {
    match action {
        GameAction::WolfKill { target } => role_actions::wolf_kill(game, actor.id, target),
        GameAction::See { target } => role_actions::see(game, actor.id, target),
        GameAction::UsePotion { potion } => role_actions::use_potion(game, actor.id, potion),
        GameAction::Protect { target } => role_actions::protect(game, actor.id, target),
        GameAction::Love { first, second } => role_actions::love(game, actor.id, first, second),
        GameAction::Spy => role_actions::spy(game, actor.id),
        GameAction::Steal { choice } => role_actions::steal(game, actor.id, choice),
        GameAction::SkipSteal => role_actions::skip_steal(game, actor.id),
        GameAction::HunterShoot { target } => role_actions::hunter_shoot(game, actor.id, target),
        GameAction::CaptainVote { candidate } => {
            vote_actions::captain_vote(game, actor.id, candidate)
        }
        GameAction::DayVote { candidate } => vote_actions::day_vote(game, actor.id, candidate),
    }
}

fn execute_admin(game: &mut GameState, actor: ActorRef, action: AdminAction) -> Outcome {
    require!(actor.admin, Reject::NotRole);
    match action {
        AdminAction::SkipSubPhase => step::resolve_current(game),
        AdminAction::EndGame | AdminAction::ForceEnd => game_end::abort(game),
    }
}
