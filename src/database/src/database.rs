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

use async_trait::async_trait;
use color_eyre::Result;
use data::core::primitives::{GameId, PlayerId};
use data::game_states::game_state::GameState;
use data::game_states::night_state::NightActionKind;
use serde::{Deserialize, Serialize};

use crate::wal::WalRecord;

/// One persisted ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRow {
    pub round: u32,
    pub voter: PlayerId,
    pub candidate: PlayerId,
    pub weight: u32,
}

/// One persisted night action. Primary key `(game, day, kind, actor)`, so
/// replays are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightActionRow {
    pub day: u32,
    pub kind: NightActionKind,
    pub actor: PlayerId,
    pub target: Option<PlayerId>,
    pub created_at_unix_ms: u64,
}

/// Everything one atomic mutation persists, committed in a single store
/// transaction: the WAL record, the new game snapshot, and the secondary
/// per-entity rows the mutation touched.
#[derive(Debug, Clone)]
pub struct CommitBatch {
    pub game: GameState,
    pub wal: WalRecord,
    pub votes: Vec<VoteRow>,
    /// Vote rounds whose rows should be dropped (tallies cleared at dusk).
    pub cleared_vote_rounds: Vec<u32>,
    pub night_actions: Vec<NightActionRow>,
    /// Players removed by this mutation (lobby leave); their rows go too.
    pub removed_players: Vec<PlayerId>,
}

impl CommitBatch {
    pub fn new(game: GameState, wal: WalRecord) -> Self {
        Self {
            game,
            wal,
            votes: Vec::new(),
            cleared_vote_rounds: Vec::new(),
            night_actions: Vec::new(),
            removed_players: Vec::new(),
        }
    }
}

/// Transactional persistence contract for games, players, votes, night
/// actions and the WAL.
///
/// A commit either fully lands or fully rolls back; the engine's crash
/// recovery assumes nothing weaker.
#[async_trait]
pub trait Database: Send + Sync {
    /// Loads every persisted game snapshot. Called once at boot.
    async fn load_all_games(&self) -> Result<Vec<GameState>>;

    async fn fetch_game(&self, id: GameId) -> Result<Option<GameState>>;

    /// Atomically applies one mutation's writes.
    async fn commit(&self, batch: CommitBatch) -> Result<()>;

    /// Removes a game and all of its secondary rows and WAL entries.
    async fn delete_game(&self, id: GameId) -> Result<()>;

    /// Persisted ballots for one round. Canonical over the in-memory tally
    /// during recovery.
    async fn load_votes(&self, id: GameId, round: u32) -> Result<Vec<VoteRow>>;

    /// Persisted night actions for one day, canonical like votes.
    async fn load_night_actions(&self, id: GameId, day: u32) -> Result<Vec<NightActionRow>>;

    /// WAL records for `id` with `seq > after_seq`, in sequence order.
    async fn read_wal_since(&self, id: GameId, after_seq: u64) -> Result<Vec<WalRecord>>;

    /// Drops WAL records with `seq > after_seq`; returns how many were
    /// discarded. Recovery uses this to heal torn commits.
    async fn discard_wal_after(&self, id: GameId, after_seq: u64) -> Result<u64>;

    /// Cheap write probe, used by the circuit breaker to detect that the
    /// store has recovered.
    async fn probe(&self) -> Result<()>;
}
