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

//! The phase scheduler: drives the day/night cycle, auto-skips sub-phases
//! with nobody to act, and resolves AFK timeouts with partial information.
//!
//! Every entry point leaves the game either in a waiting sub-phase with its
//! timer armed, or in ENDED. Transition steps (LOVERS_REVEAL, REVEIL, DAWN,
//! DUSK) are passed through inside the same mutation.

use data::core::roles::Role;
use data::events::{DeathCause, GameEvent};
use data::game_states::game_state::{GameState, HunterShootState};
use data::game_states::phase::{DayStep, NightStep, Phase, SubPhase};
use data::game_states::timer_state::TimerKind;
use data::game_states::vote_state::VoteKind;
use tracing::debug;
use utils::fail;
use utils::outcome::{Outcome, Value, OK};

use crate::mutations::{deaths, game_end, roles};
use crate::queries::{capabilities, players};
use crate::resolvers::{night, votes};

/// Enters the first night. Called once, after roles are dealt.
pub fn begin_first_night(game: &mut GameState) -> Outcome {
    game.set_phase(Phase::Night);
    game.log_action("Night falls on the village");
    enter_night_from(game, enum_iterator::first::<NightStep>())
}

/// Advances past a completed night step. Role handlers call this once their
/// step's work is done.
pub fn advance_after(game: &mut GameState, step: NightStep) -> Outcome {
    enter_night_from(game, enum_iterator::next(&step))
}

/// Resolves the current sub-phase with whatever partial information it has,
/// exactly as the AFK timeout would. Admin force-skip uses the same path, so
/// the two are indistinguishable post-state.
pub fn resolve_current(game: &mut GameState) -> Outcome {
    debug!(sub_phase = ?game.sub_phase, "Force-resolving sub-phase");
    match game.sub_phase {
        SubPhase::Lobby | SubPhase::Ended => OK,
        SubPhase::HunterShoot => {
            let Some(state) = game.hunter_shoot.take() else { return OK };
            game.log_action("The Hunter's final shot goes wide");
            finish_hunter(game, state.resume)
        }
        SubPhase::Night(step) => match step {
            NightStep::Thief => {
                resolve_thief_timeout(game)?;
                advance_after(game, step)
            }
            NightStep::Loups => {
                conclude_wolf_vote(game, true)?;
                advance_after(game, step)
            }
            NightStep::Cupid
            | NightStep::Salvateur
            | NightStep::Sorciere
            | NightStep::Voyante
            | NightStep::PetiteFille => advance_after(game, step),
            // Transition steps never wait, so there is nothing to resolve.
            NightStep::LoversReveal | NightStep::Reveil => OK,
        },
        SubPhase::Day(step) => match step {
            DayStep::VoteCapitaine => {
                conclude_captain_vote(game)?;
                enter_day_from(game, enum_iterator::next(&step))
            }
            DayStep::Deliberation => enter_day_from(game, Some(DayStep::Vote)),
            DayStep::Vote => {
                conclude_lynch_vote(game)?;
                if open_pending_hunter(game, SubPhase::Day(DayStep::Dusk))? {
                    return OK;
                }
                enter_day_from(game, Some(DayStep::Dusk))
            }
            DayStep::Dawn | DayStep::Dusk => OK,
        },
    }
}

/// Checks whether a just-cast wolf ballot completes the pack vote.
pub fn wolves_ballot_cast(game: &mut GameState) -> Outcome {
    let wolves = players::alive_wolf_ids(game);
    let complete = game
        .votes
        .get(VoteKind::Wolves)
        .is_some_and(|ballots| votes::all_voted(ballots, &wolves));
    if complete {
        conclude_wolf_vote(game, false)?;
        return advance_after(game, NightStep::Loups);
    }
    OK
}

/// Checks whether a just-cast captain ballot completes the election.
pub fn captain_ballot_cast(game: &mut GameState) -> Outcome {
    let electorate = players::alive_ids(game);
    let complete = game
        .votes
        .get(VoteKind::Captain)
        .is_some_and(|ballots| votes::all_voted(ballots, &electorate));
    if complete {
        conclude_captain_vote(game)?;
        return enter_day_from(game, enum_iterator::next(&DayStep::VoteCapitaine));
    }
    OK
}

/// Checks whether a just-cast lynch ballot completes the vote.
pub fn lynch_ballot_cast(game: &mut GameState) -> Outcome {
    let electorate = players::alive_ids(game);
    let complete = game
        .votes
        .get(VoteKind::Lynch)
        .is_some_and(|ballots| votes::all_voted(ballots, &electorate));
    if complete {
        conclude_lynch_vote(game)?;
        if open_pending_hunter(game, SubPhase::Day(DayStep::Dusk))? {
            return OK;
        }
        return enter_day_from(game, Some(DayStep::Dusk));
    }
    OK
}

/// Continues the schedule after the Hunter's shot has been applied.
pub fn hunter_shot_landed(game: &mut GameState) -> Outcome {
    let Some(state) = game.hunter_shoot.take() else {
        fail!("hunter shot landed without an open shoot state")
    };
    finish_hunter(game, state.resume)
}

fn enter_night_from(game: &mut GameState, start: Option<NightStep>) -> Outcome {
    let mut cursor = start;
    while let Some(step) = cursor {
        if !capabilities::night_step_applicable(game, step) {
            cursor = enum_iterator::next(&step);
            continue;
        }
        match step {
            NightStep::LoversReveal => {
                game.set_sub_phase(SubPhase::Night(step));
                game.log_action("The lovers discover each other");
                cursor = enum_iterator::next(&step);
            }
            NightStep::Reveil => {
                game.set_sub_phase(SubPhase::Night(step));
                night::resolve(game)?;
                game_end::check(game)?;
                if open_pending_hunter(game, SubPhase::Day(DayStep::Dawn))? {
                    return OK;
                }
                return enter_dawn(game);
            }
            _ => return begin_waiting(game, SubPhase::Night(step)),
        }
    }
    fail!("night schedule exhausted without reaching the reveil")
}

fn enter_dawn(game: &mut GameState) -> Outcome {
    game.day_count += 1;
    game.set_phase(Phase::Day);
    game.set_sub_phase(SubPhase::Day(DayStep::Dawn));
    game.log_action("Dawn breaks over the village");
    enter_day_from(game, enum_iterator::next(&DayStep::Dawn))
}

fn enter_day_from(game: &mut GameState, start: Option<DayStep>) -> Outcome {
    let mut cursor = start;
    while let Some(step) = cursor {
        if !capabilities::day_step_applicable(game, step) {
            cursor = enum_iterator::next(&step);
            continue;
        }
        match step {
            DayStep::Dawn => {
                cursor = enum_iterator::next(&step);
            }
            DayStep::Dusk => {
                game.set_sub_phase(SubPhase::Day(step));
                game_end::check(game)?;
                clear_day_tallies(game);
                game.log_action("Night falls on the village");
                game.set_phase(Phase::Night);
                game.night.actions.clear();
                return enter_night_from(game, enum_iterator::first::<NightStep>());
            }
            _ => return begin_waiting(game, SubPhase::Day(step)),
        }
    }
    fail!("day schedule exhausted without reaching dusk")
}

/// Enters a sub-phase that waits for player input: opens its ballot box if
/// it has one, arms its AFK timer, and fast-forwards if only fake
/// participants could act.
fn begin_waiting(game: &mut GameState, sub_phase: SubPhase) -> Outcome {
    game.set_sub_phase(sub_phase);
    match sub_phase {
        SubPhase::Night(NightStep::Loups) => {
            game.votes.open(VoteKind::Wolves);
            game.log_action("The wolves convene");
        }
        SubPhase::Day(DayStep::VoteCapitaine) => {
            game.votes.open(VoteKind::Captain);
            game.log_action("The village elects a captain");
        }
        SubPhase::Day(DayStep::Vote) => {
            game.votes.open(VoteKind::Lynch);
            game.log_action("The village votes");
        }
        _ => {}
    }
    game.arm_timer(TimerKind::SubPhase(sub_phase), timeout_ms(game, sub_phase));
    maybe_fast_forward_fakes(game, sub_phase)
}

fn timeout_ms(game: &GameState, sub_phase: SubPhase) -> u64 {
    match sub_phase {
        SubPhase::Day(DayStep::VoteCapitaine) => game.timeouts.captain_vote_ms,
        SubPhase::Day(DayStep::Deliberation) => game.timeouts.deliberation_ms,
        SubPhase::Day(DayStep::Vote) => game.timeouts.vote_ms,
        _ => game.timeouts.night_role_ms,
    }
}

fn maybe_fast_forward_fakes(game: &mut GameState, sub_phase: SubPhase) -> Outcome {
    if !game.skip_fake_phases {
        return OK;
    }
    // A table of nothing but fakes would cycle forever; leave it to admin
    // skips instead.
    if players::all_fake(game, &players::alive_ids(game)) {
        return OK;
    }
    let actors = capabilities::actors_for(game, sub_phase);
    if players::all_fake(game, &actors) {
        debug!(?sub_phase, "Only fake participants can act; fast-forwarding");
        return resolve_current(game);
    }
    OK
}

fn open_pending_hunter(game: &mut GameState, resume: SubPhase) -> Value<bool> {
    if game.pending_hunters.is_empty() {
        return Ok(false);
    }
    let shooter = game.pending_hunters.remove(0);
    game.hunter_shoot = Some(HunterShootState { shooter, resume });
    game.set_sub_phase(SubPhase::HunterShoot);
    game.log_action("The Hunter readies a final shot");
    game.arm_timer(TimerKind::SubPhase(SubPhase::HunterShoot), game.timeouts.night_role_ms);
    maybe_fast_forward_fakes(game, SubPhase::HunterShoot)?;
    Ok(true)
}

fn finish_hunter(game: &mut GameState, resume: SubPhase) -> Outcome {
    if open_pending_hunter(game, resume)? {
        return OK;
    }
    match resume {
        SubPhase::Day(DayStep::Dawn) => enter_dawn(game),
        SubPhase::Day(DayStep::Dusk) => enter_day_from(game, Some(DayStep::Dusk)),
        other => fail!("hunter shoot cannot resume into {other:?}"),
    }
}

fn conclude_wolf_vote(game: &mut GameState, by_timeout: bool) -> Outcome {
    let Some(ballots) = game.votes.close(VoteKind::Wolves) else { return OK };
    game.pending_cleared_rounds.push(ballots.round);

    // A timeout takes the plurality leader; a complete vote applies the
    // configured victim threshold.
    let outcome = if by_timeout {
        votes::resolve(game, &ballots)
    } else {
        let wolves = players::alive_wolf_ids(game);
        votes::pack_choice(game, &ballots, game.rules.wolf_win_condition, &wolves)
    };

    game.push_event(GameEvent::VoteCompleted {
        kind: VoteKind::Wolves,
        winner: outcome.winner,
        was_tie: outcome.was_tie,
        tally: outcome.tally.clone(),
    });
    if let Some(victim) = outcome.winner {
        game.night.victim = Some(victim);
        game.log_action("The wolves have chosen their prey");
    } else {
        game.log_action("The wolves could not agree tonight");
    }
    OK
}

fn conclude_captain_vote(game: &mut GameState) -> Outcome {
    let Some(ballots) = game.votes.close(VoteKind::Captain) else { return OK };
    game.votes.day_rounds_to_clear.push(ballots.round);

    let outcome = votes::resolve(game, &ballots);
    game.push_event(GameEvent::VoteCompleted {
        kind: VoteKind::Captain,
        winner: outcome.winner,
        was_tie: outcome.was_tie,
        tally: outcome.tally.clone(),
    });
    match outcome.winner {
        Some(captain) => {
            game.captain = Some(captain);
            game.push_event(GameEvent::CaptainElected { captain });
            let name = game.player(captain).map(|p| p.username.clone()).unwrap_or_default();
            game.log_action(format!("{name} was elected captain"));
        }
        None => game.log_action("Nobody stood for captain"),
    }
    OK
}

fn conclude_lynch_vote(game: &mut GameState) -> Outcome {
    let Some(ballots) = game.votes.close(VoteKind::Lynch) else { return OK };
    game.votes.day_rounds_to_clear.push(ballots.round);

    let outcome = votes::resolve(game, &ballots);
    game.push_event(GameEvent::VoteCompleted {
        kind: VoteKind::Lynch,
        winner: outcome.winner,
        was_tie: outcome.was_tie,
        tally: outcome.tally.clone(),
    });

    let Some(condemned) = outcome.winner else {
        game.log_action("The village could not decide");
        return OK;
    };

    // A first lynch of the Idiot reveals him instead of killing him; the
    // reveal costs him his vote. Once village powers are lost he hangs like
    // anyone else.
    let sheltered_idiot = game
        .player(condemned)
        .is_some_and(|p| p.has_role(Role::Idiot) && !p.idiot_revealed)
        && !game.village_roles_powerless;
    if sheltered_idiot {
        if let Some(player) = game.player_mut(condemned) {
            player.idiot_revealed = true;
        }
        let name = game.player(condemned).map(|p| p.username.clone()).unwrap_or_default();
        game.log_action(format!("{name} is revealed as the Idiot and spared"));
        return OK;
    }

    deaths::kill(game, condemned, DeathCause::Lynch)?;
    game_end::check(game)
}

fn resolve_thief_timeout(game: &mut GameState) -> Outcome {
    let both_wolves = game.thief_extra_roles.len() == 2
        && game.thief_extra_roles.iter().all(|role| role.is_wolf());
    if both_wolves {
        // The forced-take rule holds even against an absent Thief.
        let role = game.thief_extra_roles[0];
        if let Some(thief) = game.alive_with_role(Role::Thief).map(|p| p.id) {
            roles::swap(game, thief, role)?;
        }
    }
    game.thief_extra_roles.clear();
    OK
}

fn clear_day_tallies(game: &mut GameState) {
    let rounds = std::mem::take(&mut game.votes.day_rounds_to_clear);
    game.pending_cleared_rounds.extend(rounds);
    // Boxes left open by a force-ended day are dropped as well.
    for kind in [VoteKind::Captain, VoteKind::Lynch] {
        if let Some(ballots) = game.votes.close(kind) {
            game.pending_cleared_rounds.push(ballots.round);
        }
    }
}

#[cfg(test)]
mod tests {
    use data::core::primitives::PlayerId;
    use data::core::roles::Camp;
    use utils::outcome::{Reject, StopCondition};

    use super::*;
    use crate::action_handlers::{role_actions, vote_actions};
    use crate::test_games;

    fn assert_reject(outcome: Outcome, expected: Reject) {
        match outcome {
            Err(StopCondition::Reject(reject)) => assert_eq!(reject, expected),
            other => panic!("expected rejection {expected:?}, got {other:?}"),
        }
    }

    /// Werewolves reach a majority; the victim dies at dawn.
    #[test]
    fn wolves_majority_kill() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Werewolf),
            (3, Role::Villager),
            (4, Role::Witch),
            (5, Role::Hunter),
            (6, Role::Villager),
        ]);
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));

        role_actions::wolf_kill(&mut game, PlayerId(1), PlayerId(3)).unwrap();
        assert_eq!(game.night.victim, None);
        role_actions::wolf_kill(&mut game, PlayerId(2), PlayerId(3)).unwrap();
        assert_eq!(game.night.victim, Some(PlayerId(3)));
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Sorciere));

        // The Witch sleeps through her window.
        resolve_current(&mut game).unwrap();

        assert_eq!(game.phase, Phase::Day);
        assert_eq!(game.day_count, 1);
        assert!(!game.player(PlayerId(3)).unwrap().alive);
        assert_eq!(test_games::kill_events(&game).len(), 1);
    }

    /// The Witch's life potion cancels the wolves' kill.
    #[test]
    fn witch_saves_the_victim() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Werewolf),
            (3, Role::Villager),
            (4, Role::Witch),
            (5, Role::Hunter),
        ]);
        role_actions::wolf_kill(&mut game, PlayerId(1), PlayerId(3)).unwrap();
        role_actions::wolf_kill(&mut game, PlayerId(2), PlayerId(3)).unwrap();

        role_actions::use_potion(
            &mut game,
            PlayerId(4),
            data::actions::game_action::Potion::Life,
        )
        .unwrap();
        assert!(game.night.witch_save);
        assert!(!game.witch_potions.life);
        // Death potion still in hand, so she keeps the floor.
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Sorciere));

        resolve_current(&mut game).unwrap();
        assert_eq!(game.phase, Phase::Day);
        assert!(game.player(PlayerId(3)).unwrap().alive);
        assert!(test_games::kill_events(&game).is_empty());
    }

    /// The Salvateur's shield beats the wolves, and may not repeat.
    #[test]
    fn salvateur_blocks_the_wolves() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Werewolf),
            (3, Role::Villager),
            (4, Role::Witch),
            (5, Role::Hunter),
            (6, Role::Salvateur),
        ]);
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Salvateur));

        role_actions::protect(&mut game, PlayerId(6), PlayerId(3)).unwrap();
        role_actions::wolf_kill(&mut game, PlayerId(1), PlayerId(3)).unwrap();
        role_actions::wolf_kill(&mut game, PlayerId(2), PlayerId(3)).unwrap();
        assert_eq!(game.night.victim, Some(PlayerId(3)));

        resolve_current(&mut game).unwrap();
        assert_eq!(game.phase, Phase::Day);
        assert!(game.player(PlayerId(3)).unwrap().alive);
        assert_eq!(game.night.last_protected, Some(PlayerId(3)));
        assert!(test_games::kill_events(&game).is_empty());
    }

    #[test]
    fn salvateur_cannot_repeat_protection() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Villager),
            (3, Role::Salvateur),
        ]);
        game.night.last_protected = Some(PlayerId(2));
        assert_reject(
            role_actions::protect(&mut game, PlayerId(3), PlayerId(2)),
            Reject::CannotProtectSame,
        );
        assert_reject(
            role_actions::protect(&mut game, PlayerId(3), PlayerId(3)),
            Reject::CannotProtectSelf,
        );
    }

    /// The captain's ballot weighs two in the lynch; there is no captain
    /// re-election afterwards.
    #[test]
    fn captain_ballot_decides_the_lynch() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Villager),
            (3, Role::Villager),
            (4, Role::Villager),
        ]);
        // Nobody voted for a victim tonight.
        resolve_current(&mut game).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Day(DayStep::VoteCapitaine));

        for voter in [1, 2, 3, 4] {
            vote_actions::captain_vote(&mut game, PlayerId(voter), PlayerId(2)).unwrap();
        }
        assert_eq!(game.captain, Some(PlayerId(2)));
        assert_eq!(game.sub_phase, SubPhase::Day(DayStep::Deliberation));

        resolve_current(&mut game).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Day(DayStep::Vote));

        // Captain (2) on 3; the rest split. 3 hangs 3-2.
        vote_actions::day_vote(&mut game, PlayerId(2), PlayerId(3)).unwrap();
        vote_actions::day_vote(&mut game, PlayerId(1), PlayerId(2)).unwrap();
        vote_actions::day_vote(&mut game, PlayerId(3), PlayerId(2)).unwrap();
        vote_actions::day_vote(&mut game, PlayerId(4), PlayerId(3)).unwrap();

        assert!(!game.player(PlayerId(3)).unwrap().alive);
        // No captain succession: the seat is only contested on day one.
        assert_eq!(game.captain, Some(PlayerId(2)));
        assert_eq!(game.phase, Phase::Night);
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));
    }

    /// The Thief must take a wolf card when both leftovers are wolves.
    #[test]
    fn thief_must_take_wolf() {
        let mut game = test_games::with_roles(&[
            (1, Role::Thief),
            (2, Role::Werewolf),
            (3, Role::Villager),
            (4, Role::Villager),
            (5, Role::Villager),
        ]);
        game.thief_extra_roles = vec![Role::WhiteWolf, Role::Werewolf];
        begin_first_night(&mut game).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Thief));

        assert_reject(role_actions::skip_steal(&mut game, PlayerId(1)), Reject::MustTakeWolf);

        role_actions::steal(&mut game, PlayerId(1), data::actions::game_action::StealChoice::First)
            .unwrap();
        assert_eq!(game.player(PlayerId(1)).unwrap().role, Some(Role::WhiteWolf));
        assert!(game.thief_extra_roles.is_empty());
        assert!(game
            .pending_events
            .iter()
            .any(|event| matches!(event, GameEvent::PlayerRoleChanged { .. })));
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));
    }

    /// A lynched Idiot is revealed and spared, once.
    #[test]
    fn idiot_survives_his_first_lynch() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Idiot),
            (3, Role::Villager),
            (4, Role::Villager),
        ]);
        resolve_current(&mut game).unwrap(); // wolves silent
        resolve_current(&mut game).unwrap(); // nobody stands for captain
        resolve_current(&mut game).unwrap(); // deliberation ends
        assert_eq!(game.sub_phase, SubPhase::Day(DayStep::Vote));

        for voter in [1, 2, 3, 4] {
            vote_actions::day_vote(&mut game, PlayerId(voter), PlayerId(2)).unwrap();
        }

        let idiot = game.player(PlayerId(2)).unwrap();
        assert!(idiot.alive);
        assert!(idiot.idiot_revealed);
        assert!(test_games::kill_events(&game).is_empty());
        assert_eq!(game.phase, Phase::Night);
    }

    /// A lynched Hunter takes someone with him before dusk.
    #[test]
    fn lynched_hunter_shoots_back() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Hunter),
            (3, Role::Villager),
            (4, Role::Villager),
            (5, Role::Villager),
        ]);
        resolve_current(&mut game).unwrap();
        resolve_current(&mut game).unwrap();
        resolve_current(&mut game).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Day(DayStep::Vote));

        for voter in [1, 2, 3, 4, 5] {
            vote_actions::day_vote(&mut game, PlayerId(voter), PlayerId(2)).unwrap();
        }
        assert_eq!(game.sub_phase, SubPhase::HunterShoot);

        role_actions::hunter_shoot(&mut game, PlayerId(2), PlayerId(3)).unwrap();
        assert!(!game.player(PlayerId(3)).unwrap().alive);
        assert_eq!(game.phase, Phase::Night);
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));
    }

    /// Shooting the last wolf ends the game on the spot.
    #[test]
    fn hunter_shot_can_end_the_game() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Hunter),
            (3, Role::Villager),
            (4, Role::Villager),
            (5, Role::Villager),
        ]);
        resolve_current(&mut game).unwrap();
        resolve_current(&mut game).unwrap();
        resolve_current(&mut game).unwrap();
        for voter in [1, 2, 3, 4, 5] {
            vote_actions::day_vote(&mut game, PlayerId(voter), PlayerId(2)).unwrap();
        }

        let outcome = role_actions::hunter_shoot(&mut game, PlayerId(2), PlayerId(1));
        assert!(matches!(outcome, Err(StopCondition::GameOver)));
        assert_eq!(game.phase, Phase::Ended);
        assert_eq!(game.victory.as_ref().unwrap().camp, Camp::Village);
    }

    /// The full first-night order: Cupid, the lovers, the Thief, the
    /// Salvateur, the wolves, the Witch, the Seer, the Petite Fille.
    #[test]
    fn first_night_runs_every_step_in_order() {
        let mut game = test_games::with_roles(&[
            (1, Role::Cupid),
            (2, Role::Thief),
            (3, Role::Salvateur),
            (4, Role::Werewolf),
            (5, Role::Witch),
            (6, Role::Seer),
            (7, Role::PetiteFille),
            (8, Role::Villager),
        ]);
        game.thief_extra_roles = vec![Role::Villager, Role::Werewolf];
        begin_first_night(&mut game).unwrap();

        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Cupid));
        role_actions::love(&mut game, PlayerId(1), PlayerId(6), PlayerId(8)).unwrap();
        assert_eq!(game.lovers, Some((PlayerId(6), PlayerId(8))));
        // LOVERS_REVEAL passes through inside the same mutation.
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Thief));

        role_actions::skip_steal(&mut game, PlayerId(2)).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Salvateur));

        role_actions::protect(&mut game, PlayerId(3), PlayerId(8)).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));

        role_actions::wolf_kill(&mut game, PlayerId(4), PlayerId(3)).unwrap();
        assert_eq!(game.night.victim, Some(PlayerId(3)));
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Sorciere));

        role_actions::use_potion(
            &mut game,
            PlayerId(5),
            data::actions::game_action::Potion::Life,
        )
        .unwrap();
        role_actions::use_potion(
            &mut game,
            PlayerId(5),
            data::actions::game_action::Potion::Death { target: PlayerId(4) },
        )
        .unwrap();
        // Both potions spent closes her window.
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Voyante));

        role_actions::see(&mut game, PlayerId(6), PlayerId(4)).unwrap();
        assert!(game.pending_events.iter().any(|event| matches!(
            event,
            GameEvent::SeerVision { target: PlayerId(4), role: Role::Werewolf, .. }
        )));
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::PetiteFille));

        // The spy report lands, and then the night resolves: the witch saved
        // the wolves' victim but poisoned the only wolf, so the village wins
        // before dawn ever breaks.
        let outcome = role_actions::spy(&mut game, PlayerId(7));
        assert!(matches!(outcome, Err(StopCondition::GameOver)));
        assert!(game
            .pending_events
            .iter()
            .any(|event| matches!(event, GameEvent::SpyReport { .. })));
        assert_eq!(game.phase, Phase::Ended);
        assert_eq!(game.victory.as_ref().unwrap().camp, Camp::Village);
        assert!(game.player(PlayerId(3)).unwrap().alive);
        assert!(!game.player(PlayerId(4)).unwrap().alive);
    }

    /// Poisoning the Ancien costs the village its role powers.
    #[test]
    fn poisoned_ancien_silences_the_village_powers() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Werewolf),
            (3, Role::Ancien),
            (4, Role::Witch),
            (5, Role::Villager),
            (6, Role::Villager),
        ]);
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));
        resolve_current(&mut game).unwrap(); // wolves silent
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Sorciere));

        role_actions::use_potion(
            &mut game,
            PlayerId(4),
            data::actions::game_action::Potion::Death { target: PlayerId(3) },
        )
        .unwrap();
        resolve_current(&mut game).unwrap();

        assert!(!game.player(PlayerId(3)).unwrap().alive);
        assert!(game.village_roles_powerless);
    }

    /// Once the village powers are gone, a second lynch hangs the Idiot.
    #[test]
    fn powerless_idiot_hangs_like_anyone_else() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Idiot),
            (3, Role::Villager),
            (4, Role::Villager),
            (5, Role::Villager),
        ]);
        game.village_roles_powerless = true;
        resolve_current(&mut game).unwrap();
        resolve_current(&mut game).unwrap();
        resolve_current(&mut game).unwrap();
        assert_eq!(game.sub_phase, SubPhase::Day(DayStep::Vote));

        for voter in [1, 2, 3, 4, 5] {
            vote_actions::day_vote(&mut game, PlayerId(voter), PlayerId(2)).unwrap();
        }
        assert!(!game.player(PlayerId(2)).unwrap().alive);
    }

    /// Timeouts resolve with partial information; a late duplicate is a
    /// no-op because the sub-phase has moved on.
    #[test]
    fn timeout_with_no_wolf_ballots_spares_everyone() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Villager),
            (3, Role::Villager),
        ]);
        assert_eq!(game.sub_phase, SubPhase::Night(NightStep::Loups));
        resolve_current(&mut game).unwrap();
        assert_eq!(game.phase, Phase::Day);
        assert_eq!(game.alive_count(), 3);
        assert_reject(
            role_actions::wolf_kill(&mut game, PlayerId(1), PlayerId(2)),
            Reject::NotNight,
        );
    }

    /// Wolf parity at dusk hands the game to the pack.
    #[test]
    fn wolves_win_at_parity() {
        let mut game = test_games::started(&[
            (1, Role::Werewolf),
            (2, Role::Werewolf),
            (3, Role::Villager),
            (4, Role::Villager),
            (5, Role::Villager),
        ]);
        role_actions::wolf_kill(&mut game, PlayerId(1), PlayerId(3)).unwrap();
        let outcome = role_actions::wolf_kill(&mut game, PlayerId(2), PlayerId(3));
        // Two wolves against two villagers at dawn: game over.
        assert!(matches!(outcome, Err(StopCondition::GameOver)));
        assert_eq!(game.phase, Phase::Ended);
        assert_eq!(game.victory.as_ref().unwrap().camp, Camp::Wolves);
        assert_eq!(game.active_timer, None);
    }
}

