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

//! Shared weighted-tally resolution for the captain election, the day lynch
//! and the wolves' pack vote.

use std::collections::BTreeMap;

use data::config::WolfWinCondition;
use data::core::primitives::{GameId, PlayerId};
use data::game_states::game_state::GameState;
use data::game_states::vote_state::{Ballots, VoteKind};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Result of closing a ballot box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyOutcome {
    pub winner: Option<PlayerId>,
    pub was_tie: bool,
    /// Weighted counts, heaviest first, candidate id ascending within equal
    /// weights.
    pub tally: Vec<(PlayerId, u32)>,
}

/// The weight of `voter`'s ballot in a tally of the given kind.
///
/// The captain's ballot counts double in the day lynch only; a revealed
/// Idiot's lynch ballot counts nothing. Every other ballot counts one.
pub fn ballot_weight(game: &GameState, kind: VoteKind, voter: PlayerId) -> u32 {
    if kind != VoteKind::Lynch {
        return 1;
    }
    if game.player(voter).is_some_and(|p| p.idiot_revealed) {
        return 0;
    }
    if game.captain == Some(voter) {
        2
    } else {
        1
    }
}

/// Collapses ballots into weighted per-candidate counts.
pub fn weighted_tally(game: &GameState, ballots: &Ballots) -> Vec<(PlayerId, u32)> {
    let mut counts: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for (&voter, &candidate) in &ballots.by_voter {
        *counts.entry(candidate).or_default() += ballot_weight(game, ballots.kind, voter);
    }
    let mut tally: Vec<(PlayerId, u32)> = counts.into_iter().collect();
    tally.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    tally
}

/// Picks the winner from a closed ballot box.
///
/// Ties are broken by a uniform choice amongst the tied candidates, drawn
/// from a generator seeded by `{game, round}` so re-running the same round
/// reproduces the same winner.
pub fn resolve(game: &GameState, ballots: &Ballots) -> TallyOutcome {
    let tally = weighted_tally(game, ballots);
    let top_weight = tally.first().map(|(_, w)| *w).unwrap_or(0);
    if top_weight == 0 {
        return TallyOutcome { winner: None, was_tie: false, tally };
    }

    let tied: Vec<PlayerId> =
        tally.iter().take_while(|(_, w)| *w == top_weight).map(|(id, _)| *id).collect();
    let was_tie = tied.len() > 1;
    let winner = if was_tie {
        let mut rng = round_rng(game.id, ballots.round);
        tied[rng.gen_range(0..tied.len())]
    } else {
        tied[0]
    };

    TallyOutcome { winner: Some(winner), was_tie, tally }
}

/// Whether every player in `electorate` has cast a ballot.
pub fn all_voted(ballots: &Ballots, electorate: &[PlayerId]) -> bool {
    !electorate.is_empty() && electorate.iter().all(|id| ballots.by_voter.contains_key(id))
}

/// Applies the pack's victim threshold when the wolves' vote closes with
/// every alive wolf having voted.
///
/// Under `Majority` the (tie-broken) leader needs at least ⌈W/2⌉ ballots,
/// W being the count of alive wolves; under `Elimination` the pack must be
/// unanimous. A vote closed by timeout bypasses this and takes the plurality
/// leader instead.
pub fn pack_choice(
    game: &GameState,
    ballots: &Ballots,
    condition: WolfWinCondition,
    alive_wolves: &[PlayerId],
) -> TallyOutcome {
    let outcome = resolve(game, ballots);
    let top_weight = outcome.tally.first().map(|(_, w)| *w).unwrap_or(0);
    let winner = match condition {
        WolfWinCondition::Majority => {
            let threshold = (alive_wolves.len() as u32).div_ceil(2);
            outcome.winner.filter(|_| top_weight >= threshold)
        }
        WolfWinCondition::Elimination => {
            let leader = outcome.winner;
            leader.filter(|&candidate| {
                ballots.by_voter.values().all(|&ballot| ballot == candidate)
            })
        }
    };
    TallyOutcome { winner, ..outcome }
}

fn round_rng(game_id: GameId, round: u32) -> Xoshiro256StarStar {
    let seed = game_id.0 ^ (round as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    Xoshiro256StarStar::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use data::config::{EngineConfig, GameRules};
    use data::core::primitives::GuildId;
    use data::core::roles::Role;
    use data::player_states::player_state::PlayerState;

    use super::*;

    fn test_game() -> GameState {
        let mut game = GameState::new(
            GameId(42),
            GuildId(1),
            GameRules::default(),
            &EngineConfig::default(),
            1_000,
        );
        for id in 1..=4 {
            let mut player = PlayerState::new(PlayerId(id), format!("p{id}"), 1_000);
            player.role = Some(Role::Villager);
            game.players.push(player);
        }
        game
    }

    fn ballots(kind: VoteKind, pairs: &[(u64, u64)]) -> Ballots {
        let mut ballots = Ballots::open(kind, 1);
        for &(voter, candidate) in pairs {
            ballots.cast(PlayerId(voter), PlayerId(candidate));
        }
        ballots
    }

    #[test]
    fn captain_ballot_counts_double_in_lynch() {
        let mut game = test_game();
        game.captain = Some(PlayerId(1));
        // Captain's ballot (1→2) weighs two, so candidate 2 takes it 3-1.
        let ballots = ballots(VoteKind::Lynch, &[(1, 2), (3, 2), (4, 4)]);
        let outcome = resolve(&game, &ballots);
        assert_eq!(outcome.winner, Some(PlayerId(2)));
        assert!(!outcome.was_tie);
        assert_eq!(outcome.tally[0], (PlayerId(2), 3));
    }

    #[test]
    fn captain_ballot_is_single_weight_outside_lynch() {
        let mut game = test_game();
        game.captain = Some(PlayerId(1));
        let ballots = ballots(VoteKind::Captain, &[(1, 2), (3, 4), (4, 4)]);
        let outcome = resolve(&game, &ballots);
        assert_eq!(outcome.winner, Some(PlayerId(4)));
    }

    #[test]
    fn revealed_idiot_ballot_counts_nothing() {
        let mut game = test_game();
        game.player_mut(PlayerId(1)).unwrap().idiot_revealed = true;
        let ballots = ballots(VoteKind::Lynch, &[(1, 2), (3, 4)]);
        let outcome = resolve(&game, &ballots);
        assert_eq!(outcome.winner, Some(PlayerId(4)));
        assert_eq!(outcome.tally.iter().find(|(id, _)| *id == PlayerId(2)), Some(&(PlayerId(2), 0)));
    }

    #[test]
    fn tie_break_is_deterministic_per_round() {
        let game = test_game();
        let ballots = ballots(VoteKind::Lynch, &[(1, 2), (2, 1), (3, 2), (4, 1)]);
        let first = resolve(&game, &ballots);
        assert!(first.was_tie);
        for _ in 0..10 {
            assert_eq!(resolve(&game, &ballots), first);
        }
    }

    #[test]
    fn no_ballots_elects_nobody() {
        let game = test_game();
        let ballots = Ballots::open(VoteKind::Captain, 1);
        let outcome = resolve(&game, &ballots);
        assert_eq!(outcome.winner, None);
        assert!(!outcome.was_tie);
    }

    #[test]
    fn pack_choice_applies_the_victim_threshold() {
        let game = test_game();
        let wolves = vec![PlayerId(1), PlayerId(2)];

        let agreed = ballots(VoteKind::Wolves, &[(1, 3), (2, 3)]);
        assert_eq!(
            pack_choice(&game, &agreed, WolfWinCondition::Majority, &wolves).winner,
            Some(PlayerId(3))
        );
        assert_eq!(
            pack_choice(&game, &agreed, WolfWinCondition::Elimination, &wolves).winner,
            Some(PlayerId(3))
        );

        let split = ballots(VoteKind::Wolves, &[(1, 3), (2, 4)]);
        assert_eq!(
            pack_choice(&game, &split, WolfWinCondition::Elimination, &wolves).winner,
            None
        );
        // A 1-1 split still satisfies the ⌈2/2⌉ majority threshold after the
        // tie-break.
        assert!(pack_choice(&game, &split, WolfWinCondition::Majority, &wolves).winner.is_some());
    }
}
