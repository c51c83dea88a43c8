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

use data::actions::game_action::{Potion, StealChoice};
use data::core::primitives::PlayerId;
use data::core::roles::Role;
use data::events::{DeathCause, GameEvent};
use data::game_states::game_state::GameState;
use data::game_states::night_state::{NightAction, NightActionKind};
use data::game_states::phase::{NightStep, SubPhase};
use data::game_states::vote_state::VoteKind;
use tracing::debug;
use utils::outcome::{Outcome, Reject, OK};
use utils::{fail, require};

use crate::legality::preconditions;
use crate::mutations::{deaths, game_end, roles};
use crate::queries::players;
use crate::steps::step;

fn record(game: &mut GameState, kind: NightActionKind, actor: PlayerId, target: Option<PlayerId>) {
    let action = NightAction {
        day: game.day_count,
        kind,
        actor,
        target,
        created_at_unix_ms: game.now_unix_ms,
    };
    game.night.record(action);
}

/// A wolf's ballot in the pack vote. Wolves cannot be targeted.
pub fn wolf_kill(game: &mut GameState, actor: PlayerId, target: PlayerId) -> Outcome {
    preconditions::expect_night_step(game, NightStep::Loups)?;
    preconditions::expect_actor_alive(game, actor)?;
    require!(game.player(actor).is_some_and(|p| p.is_wolf()), Reject::NotRole);
    preconditions::expect_target_alive(game, target)?;
    require!(!game.player(target).is_some_and(|p| p.is_wolf()), Reject::CannotTargetWolf);

    record(game, NightActionKind::Kill, actor, Some(target));
    let Some(ballots) = game.votes.get_mut(VoteKind::Wolves) else {
        fail!("wolves' ballot box missing during LOUPS")
    };
    ballots.cast(actor, target);
    game.push_event(GameEvent::VoteCast { kind: VoteKind::Wolves, voter: actor, candidate: target });
    step::wolves_ballot_cast(game)
}

/// The Seer inspects a player's current role.
pub fn see(game: &mut GameState, actor: PlayerId, target: PlayerId) -> Outcome {
    preconditions::expect_night_step(game, NightStep::Voyante)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_role(game, actor, Role::Seer)?;
    preconditions::expect_target_alive(game, target)?;

    record(game, NightActionKind::See, actor, Some(target));
    let Some(role) = game.player(target).and_then(|p| p.role) else {
        fail!("seer target {target:?} has no role")
    };
    debug!(?actor, ?target, "Seer vision");
    game.push_event(GameEvent::SeerVision { seer: actor, target, role });
    step::advance_after(game, NightStep::Voyante)
}

/// The Witch spends a potion. She keeps the floor until she has nothing
/// left to spend (or her timeout fires).
pub fn use_potion(game: &mut GameState, actor: PlayerId, potion: Potion) -> Outcome {
    preconditions::expect_night_step(game, NightStep::Sorciere)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_role(game, actor, Role::Witch)?;

    match potion {
        Potion::Life => {
            require!(game.night.victim.is_some(), Reject::NoVictimTonight);
            require!(game.witch_potions.life, Reject::NoLifePotion);
            game.witch_potions.life = false;
            game.night.witch_save = true;
            record(game, NightActionKind::Save, actor, game.night.victim);
        }
        Potion::Death { target } => {
            require!(game.witch_potions.death, Reject::NoDeathPotion);
            require!(target != actor, Reject::CannotPoisonSelf);
            preconditions::expect_target_alive(game, target)?;
            game.witch_potions.death = false;
            game.night.witch_kill_target = Some(target);
            record(game, NightActionKind::Poison, actor, Some(target));
        }
    }

    let nothing_left = !game.witch_potions.death
        && (!game.witch_potions.life || game.night.victim.is_none() || game.night.witch_save);
    if nothing_left {
        return step::advance_after(game, NightStep::Sorciere);
    }
    OK
}

/// The Salvateur shields a player. Never himself, never the same player two
/// nights running.
pub fn protect(game: &mut GameState, actor: PlayerId, target: PlayerId) -> Outcome {
    preconditions::expect_night_step(game, NightStep::Salvateur)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_role(game, actor, Role::Salvateur)?;
    preconditions::expect_target_alive(game, target)?;
    require!(target != actor, Reject::CannotProtectSelf);
    require!(game.night.last_protected != Some(target), Reject::CannotProtectSame);

    game.night.protected = Some(target);
    record(game, NightActionKind::Protect, actor, Some(target));
    step::advance_after(game, NightStep::Salvateur)
}

/// Cupid binds two players for the rest of the game. Night one only.
pub fn love(game: &mut GameState, actor: PlayerId, first: PlayerId, second: PlayerId) -> Outcome {
    preconditions::expect_night_step(game, NightStep::Cupid)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_role(game, actor, Role::Cupid)?;
    require!(first != second, Reject::InvalidChoice);
    preconditions::expect_target_alive(game, first)?;
    preconditions::expect_target_alive(game, second)?;

    game.lovers = Some((first, second));
    for id in [first, second] {
        if let Some(player) = game.player_mut(id) {
            player.in_love = true;
        }
    }
    record(game, NightActionKind::Love, actor, Some(first));
    game.log_action("Cupid has drawn his bow");
    step::advance_after(game, NightStep::Cupid)
}

/// The Petite Fille peeks at the wolves and learns who they are.
pub fn spy(game: &mut GameState, actor: PlayerId) -> Outcome {
    preconditions::expect_night_step(game, NightStep::PetiteFille)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_role(game, actor, Role::PetiteFille)?;

    record(game, NightActionKind::Spy, actor, None);
    let wolves = players::alive_wolf_ids(game);
    game.push_event(GameEvent::SpyReport { spy: actor, wolves });
    step::advance_after(game, NightStep::PetiteFille)
}

/// The Thief swaps his card for one of the two leftovers.
pub fn steal(game: &mut GameState, actor: PlayerId, choice: StealChoice) -> Outcome {
    preconditions::expect_night_step(game, NightStep::Thief)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_role(game, actor, Role::Thief)?;
    require!(game.thief_extra_roles.len() == 2, Reject::InvalidChoice);

    let role = game.thief_extra_roles[choice.index()];
    roles::swap(game, actor, role)?;
    record(game, NightActionKind::Steal, actor, None);
    game.thief_extra_roles.clear();
    step::advance_after(game, NightStep::Thief)
}

/// The Thief keeps his own card, which the rules forbid when both leftovers
/// are wolf-aligned.
pub fn skip_steal(game: &mut GameState, actor: PlayerId) -> Outcome {
    preconditions::expect_night_step(game, NightStep::Thief)?;
    preconditions::expect_actor_alive(game, actor)?;
    preconditions::expect_role(game, actor, Role::Thief)?;
    require!(game.thief_extra_roles.len() == 2, Reject::InvalidChoice);
    require!(
        !game.thief_extra_roles.iter().all(|role| role.is_wolf()),
        Reject::MustTakeWolf
    );

    game.thief_extra_roles.clear();
    step::advance_after(game, NightStep::Thief)
}

/// The dead Hunter's parting shot, taken during the transient HUNTER_SHOOT
/// sub-phase. The actor is dead by definition, so no aliveness check.
pub fn hunter_shoot(game: &mut GameState, actor: PlayerId, target: PlayerId) -> Outcome {
    require!(game.sub_phase == SubPhase::HunterShoot, Reject::WrongSubPhase);
    require!(
        game.hunter_shoot.is_some_and(|state| state.shooter == actor),
        Reject::NotRole
    );
    preconditions::expect_target_alive(game, target)?;

    deaths::kill(game, target, DeathCause::HunterShot)?;
    game_end::check(game)?;
    step::hunter_shot_landed(game)
}

#[cfg(test)]
mod tests {
    use data::game_states::phase::Phase;
    use utils::outcome::StopCondition;

    use super::*;
    use crate::test_games;

    fn assert_reject(outcome: Outcome, expected: Reject) {
        match outcome {
            Err(StopCondition::Reject(reject)) => assert_eq!(reject, expected),
            other => panic!("expected rejection {expected:?}, got {other:?}"),
        }
    }

    fn night_game() -> GameState {
        test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Werewolf),
            (3, Role::Villager),
            (4, Role::Witch),
            (5, Role::Seer),
        ])
    }

    #[test]
    fn wolves_cannot_target_the_pack() {
        let mut game = night_game();
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));
        assert_reject(wolf_kill(&mut game, PlayerId(1), PlayerId(2)), Reject::CannotTargetWolf);
        assert_reject(wolf_kill(&mut game, PlayerId(3), PlayerId(1)), Reject::NotRole);
        assert_reject(wolf_kill(&mut game, PlayerId(1), PlayerId(99)), Reject::TargetNotFound);
    }

    #[test]
    fn seer_cannot_act_out_of_turn() {
        let mut game = night_game();
        assert_reject(see(&mut game, PlayerId(5), PlayerId(1)), Reject::WrongSubPhase);
    }

    #[test]
    fn day_intents_are_refused_at_night() {
        let mut game = night_game();
        assert_reject(
            crate::action_handlers::vote_actions::day_vote(&mut game, PlayerId(3), PlayerId(1)),
            Reject::NotDay,
        );
    }

    #[test]
    fn witch_potion_preconditions() {
        let mut game = night_game();
        // Move her window open with no victim chosen.
        wolf_kill(&mut game, PlayerId(1), PlayerId(3)).unwrap();
        wolf_kill(&mut game, PlayerId(2), PlayerId(3)).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Sorciere));

        assert_reject(
            use_potion(&mut game, PlayerId(4), Potion::Death { target: PlayerId(4) }),
            Reject::CannotPoisonSelf,
        );

        game.witch_potions.life = false;
        assert_reject(use_potion(&mut game, PlayerId(4), Potion::Life), Reject::NoLifePotion);

        game.witch_potions.death = false;
        assert_reject(
            use_potion(&mut game, PlayerId(4), Potion::Death { target: PlayerId(3) }),
            Reject::NoDeathPotion,
        );
    }

    #[test]
    fn witch_cannot_save_without_a_victim() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Villager),
            (3, Role::Witch),
        ]);
        // Wolves stay silent; her step arrives with no victim.
        crate::steps::step::resolve_current(&mut game).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Sorciere));
        assert_reject(use_potion(&mut game, PlayerId(3), Potion::Life), Reject::NoVictimTonight);
    }

    #[test]
    fn village_powers_die_with_a_lynched_ancien() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Werewolf),
            (3, Role::Seer),
            (4, Role::Villager),
            (5, Role::Villager),
        ]);
        game.village_roles_powerless = true;

        // The Seer's step is auto-skipped entirely on the next pass, but
        // even a racing intent is refused.
        game.sub_phase = SubPhase::Night(NightStep::Voyante);
        assert_reject(see(&mut game, PlayerId(3), PlayerId(1)), Reject::PowersLost);

        // Wolves keep their kill regardless.
        game.sub_phase = SubPhase::Night(NightStep::Loups);
        game.votes.open(VoteKind::Wolves);
        wolf_kill(&mut game, PlayerId(1), PlayerId(3)).unwrap();
        assert!(game.phase == Phase::Night);
    }

    #[test]
    fn dead_actors_are_turned_away() {
        let mut game = night_game();
        game.player_mut(PlayerId(1)).unwrap().alive = false;
        game.dead.push(PlayerId(1));
        assert_reject(wolf_kill(&mut game, PlayerId(1), PlayerId(3)), Reject::ActorDead);
        assert_reject(wolf_kill(&mut game, PlayerId(2), PlayerId(1)), Reject::TargetDead);
    }
}
