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

use data::core::roles::Role;
use data::events::{DeathCause, GameEvent};
use data::game_states::game_state::GameState;
use data::game_states::vote_state::VoteKind;
use tracing::debug;
use utils::outcome::{Outcome, OK};

use crate::mutations::deaths;

/// Computes the night's deaths, once per NIGHT→DAY transition.
///
/// Resolution order is fixed: the wolves' victim is cancelled by the
/// Salvateur's shield, then by the Witch's life potion, then by the Ancien's
/// first life; the Witch's poison lands unconditionally afterwards. Lover
/// and Hunter chains hang off each applied kill.
pub fn resolve(game: &mut GameState) -> Outcome {
    let dead_before = game.dead.len();
    let mut victim = game.night.victim;

    if victim.is_some() && game.night.protected == victim {
        debug!(?victim, "Night victim shielded by the Salvateur");
        victim = None;
    }

    if victim.is_some() && game.night.witch_save {
        debug!(?victim, "Night victim saved by the Witch");
        victim = None;
    }

    if let Some(target) = victim {
        let is_unhit_ancien =
            game.player(target).is_some_and(|p| p.has_role(Role::Ancien)) && !game.ancien_hit;
        if is_unhit_ancien {
            game.ancien_hit = true;
            game.log_action("The Ancien shrugged off the wolves' attack");
            victim = None;
        }
    }

    if let Some(target) = victim {
        if game.player(target).is_some_and(|p| p.alive) {
            deaths::kill(game, target, DeathCause::Wolves)?;
        }
    }

    if let Some(target) = game.night.witch_kill_target {
        if game.player(target).is_some_and(|p| p.alive) {
            deaths::kill(game, target, DeathCause::WitchPoison)?;
        }
    }

    let deaths: Vec<_> = game.dead[dead_before..].to_vec();
    game.push_event(GameEvent::NightResolved { day: game.day_count, deaths });

    // Per-night fields reset; the shield carries over as the no-repeat
    // reference for tomorrow night.
    game.night.victim = None;
    game.night.witch_save = false;
    game.night.witch_kill_target = None;
    game.night.last_protected = game.night.protected.take();
    // The wolves' ballot box normally closes when LOUPS resolves; a box
    // still open here means the step was force-ended.
    if let Some(ballots) = game.votes.close(VoteKind::Wolves) {
        game.pending_cleared_rounds.push(ballots.round);
    }

    OK
}
