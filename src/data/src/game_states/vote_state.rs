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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::core::primitives::PlayerId;

/// The three tallies that share one resolution algorithm.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    /// First-day captain election.
    Captain,
    /// Day lynch vote. The captain's ballot counts double here.
    Lynch,
    /// The wolves' in-pack vote for tonight's victim.
    Wolves,
}

/// One open ballot box: `voter → candidate`, re-voting overwrites.
///
/// `round` is the game-wide round counter the rows are persisted under; it
/// increments every time a new vote opens so historical rounds stay
/// addressable in the store.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ballots {
    pub kind: VoteKind,
    pub round: u32,
    // Serialized as pairs; JSON maps want string keys.
    #[serde_as(as = "Vec<(_, _)>")]
    pub by_voter: BTreeMap<PlayerId, PlayerId>,
}

impl Ballots {
    pub fn open(kind: VoteKind, round: u32) -> Self {
        Self { kind, round, by_voter: BTreeMap::new() }
    }

    /// Records or overwrites `voter`'s ballot.
    pub fn cast(&mut self, voter: PlayerId, candidate: PlayerId) {
        self.by_voter.insert(voter, candidate);
    }

    pub fn voter_count(&self) -> usize {
        self.by_voter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_voter.is_empty()
    }
}

/// All vote state carried by a game.
///
/// At most one of `captain`/`lynch` is open at a time (they are village-wide
/// votes tied to day sub-phases); `wolves` only opens during the LOUPS night
/// step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteLedger {
    /// Next round number to assign when a vote opens.
    pub next_round: u32,

    pub captain: Option<Ballots>,
    pub lynch: Option<Ballots>,
    pub wolves: Option<Ballots>,

    /// Rounds resolved earlier today; their store rows are dropped when the
    /// day's tallies are cleared at dusk.
    pub day_rounds_to_clear: Vec<u32>,
}

impl VoteLedger {
    /// Opens a fresh ballot box of the given kind, assigning it the next
    /// round number.
    pub fn open(&mut self, kind: VoteKind) -> u32 {
        let round = self.next_round;
        self.next_round += 1;
        let ballots = Ballots::open(kind, round);
        match kind {
            VoteKind::Captain => self.captain = Some(ballots),
            VoteKind::Lynch => self.lynch = Some(ballots),
            VoteKind::Wolves => self.wolves = Some(ballots),
        }
        round
    }

    pub fn get(&self, kind: VoteKind) -> Option<&Ballots> {
        match kind {
            VoteKind::Captain => self.captain.as_ref(),
            VoteKind::Lynch => self.lynch.as_ref(),
            VoteKind::Wolves => self.wolves.as_ref(),
        }
    }

    pub fn get_mut(&mut self, kind: VoteKind) -> Option<&mut Ballots> {
        match kind {
            VoteKind::Captain => self.captain.as_mut(),
            VoteKind::Lynch => self.lynch.as_mut(),
            VoteKind::Wolves => self.wolves.as_mut(),
        }
    }

    /// Closes and returns the ballot box of the given kind.
    pub fn close(&mut self, kind: VoteKind) -> Option<Ballots> {
        match kind {
            VoteKind::Captain => self.captain.take(),
            VoteKind::Lynch => self.lynch.take(),
            VoteKind::Wolves => self.wolves.take(),
        }
    }
}
