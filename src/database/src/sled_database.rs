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
use color_eyre::eyre::{eyre, Context};
use color_eyre::{Report, Result};
use data::core::primitives::{GameId, PlayerId};
use data::game_states::game_state::GameState;
use serde_json::{de, ser};
use sled::transaction::{TransactionError, Transactional};
use sled::{Db, Tree};

use crate::database::{CommitBatch, Database, NightActionRow, VoteRow};
use crate::wal::WalRecord;

/// One logical table per entity kind, all inside a single sled [Db] so a
/// commit can span them transactionally.
pub struct SledDatabase {
    db: Db,
}

impl SledDatabase {
    pub fn new(path: impl Into<String>) -> Self {
        Self { db: sled::open(path.into()).expect("Unable to open database") }
    }

    /// In-memory database for tests; contents are dropped on close.
    pub fn temporary() -> Self {
        Self {
            db: sled::Config::new()
                .temporary(true)
                .open()
                .expect("Unable to open temporary database"),
        }
    }

    fn games(&self) -> Result<Tree> {
        self.db.open_tree("games").with_context(|| "Error opening the 'games' tree")
    }

    fn players(&self) -> Result<Tree> {
        self.db.open_tree("players").with_context(|| "Error opening the 'players' tree")
    }

    fn votes(&self) -> Result<Tree> {
        self.db.open_tree("votes").with_context(|| "Error opening the 'votes' tree")
    }

    fn night_actions(&self) -> Result<Tree> {
        self.db.open_tree("night_actions").with_context(|| "Error opening the 'night_actions' tree")
    }

    fn wal(&self) -> Result<Tree> {
        self.db.open_tree("wal").with_context(|| "Error opening the 'wal' tree")
    }

    fn meta(&self) -> Result<Tree> {
        self.db.open_tree("meta").with_context(|| "Error opening the 'meta' tree")
    }

    fn remove_prefix(&self, tree: &Tree, prefix: &[u8]) -> Result<u64> {
        let mut removed = 0;
        for key in tree.scan_prefix(prefix).keys() {
            tree.remove(key?)?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[async_trait]
impl Database for SledDatabase {
    async fn load_all_games(&self) -> Result<Vec<GameState>> {
        let mut games = Vec::new();
        for entry in self.games()?.iter() {
            let (_, slice) = entry?;
            games.push(
                de::from_slice::<GameState>(&slice)
                    .with_context(|| "Error deserializing game snapshot")?,
            );
        }
        Ok(games)
    }

    async fn fetch_game(&self, id: GameId) -> Result<Option<GameState>> {
        self.games()?
            .get(id.to_key())
            .with_context(|| format!("Error fetching game {id:?}"))?
            .map(|slice| {
                de::from_slice::<GameState>(&slice)
                    .with_context(|| format!("Error deserializing game {id:?}"))
            })
            .transpose()
    }

    async fn commit(&self, batch: CommitBatch) -> Result<()> {
        let game_id = batch.game.id;
        let game_bytes = ser::to_vec(&batch.game)
            .with_context(|| format!("Error serializing game {game_id:?}"))?;
        let wal_bytes = ser::to_vec(&batch.wal)
            .with_context(|| format!("Error serializing WAL record for {game_id:?}"))?;
        let wal_key = wal_key(game_id, batch.wal.seq);

        let player_rows = batch
            .game
            .players
            .iter()
            .map(|player| Ok((player_key(game_id, player.id), ser::to_vec(player)?)))
            .collect::<Result<Vec<_>>>()?;
        let vote_rows = batch
            .votes
            .iter()
            .map(|row| Ok((vote_key(game_id, row.round, row.voter), ser::to_vec(row)?)))
            .collect::<Result<Vec<_>>>()?;
        let night_rows = batch
            .night_actions
            .iter()
            .map(|row| {
                Ok((night_key(game_id, row.day, row.kind.to_key(), row.actor), ser::to_vec(row)?))
            })
            .collect::<Result<Vec<_>>>()?;
        // Vote rows are keyed by voter, so clearing a round means removing
        // one key per known player.
        let cleared_keys = batch
            .cleared_vote_rounds
            .iter()
            .flat_map(|&round| {
                batch.game.players.iter().map(move |p| vote_key(game_id, round, p.id))
            })
            .collect::<Vec<_>>();
        let removed_player_keys = batch
            .removed_players
            .iter()
            .map(|&player| player_key(game_id, player))
            .collect::<Vec<_>>();

        let games = self.games()?;
        let players = self.players()?;
        let votes = self.votes()?;
        let nights = self.night_actions()?;
        let wal = self.wal()?;

        (&games, &players, &votes, &nights, &wal)
            .transaction(|(games_tx, players_tx, votes_tx, nights_tx, wal_tx)| {
                wal_tx.insert(&wal_key[..], wal_bytes.clone())?;
                games_tx.insert(&game_id.to_key()[..], game_bytes.clone())?;
                for (key, value) in &player_rows {
                    players_tx.insert(&key[..], value.clone())?;
                }
                for key in &removed_player_keys {
                    players_tx.remove(&key[..])?;
                }
                for key in &cleared_keys {
                    votes_tx.remove(&key[..])?;
                }
                for (key, value) in &vote_rows {
                    votes_tx.insert(&key[..], value.clone())?;
                }
                for (key, value) in &night_rows {
                    nights_tx.insert(&key[..], value.clone())?;
                }
                Ok(())
            })
            .map_err(|error: TransactionError<()>| match error {
                TransactionError::Abort(()) => eyre!("commit aborted for game {game_id:?}"),
                TransactionError::Storage(storage) => Report::new(storage),
            })?;

        self.db.flush_async().await?;
        Ok(())
    }

    async fn delete_game(&self, id: GameId) -> Result<()> {
        let prefix = id.to_key();
        self.games()?.remove(prefix)?;
        self.remove_prefix(&self.players()?, &prefix)?;
        self.remove_prefix(&self.votes()?, &prefix)?;
        self.remove_prefix(&self.night_actions()?, &prefix)?;
        self.remove_prefix(&self.wal()?, &prefix)?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn load_votes(&self, id: GameId, round: u32) -> Result<Vec<VoteRow>> {
        let mut prefix = [0; 12];
        prefix[..8].copy_from_slice(&id.to_key());
        prefix[8..].copy_from_slice(&round.to_be_bytes());
        let mut rows = Vec::new();
        for entry in self.votes()?.scan_prefix(prefix) {
            let (_, slice) = entry?;
            rows.push(
                de::from_slice::<VoteRow>(&slice)
                    .with_context(|| format!("Error deserializing vote row for {id:?}"))?,
            );
        }
        Ok(rows)
    }

    async fn load_night_actions(&self, id: GameId, day: u32) -> Result<Vec<NightActionRow>> {
        let mut prefix = [0; 12];
        prefix[..8].copy_from_slice(&id.to_key());
        prefix[8..].copy_from_slice(&day.to_be_bytes());
        let mut rows = Vec::new();
        for entry in self.night_actions()?.scan_prefix(prefix) {
            let (_, slice) = entry?;
            rows.push(
                de::from_slice::<NightActionRow>(&slice)
                    .with_context(|| format!("Error deserializing night action for {id:?}"))?,
            );
        }
        Ok(rows)
    }

    async fn read_wal_since(&self, id: GameId, after_seq: u64) -> Result<Vec<WalRecord>> {
        let mut records = Vec::new();
        for entry in self.wal()?.scan_prefix(id.to_key()) {
            let (_, slice) = entry?;
            let record = de::from_slice::<WalRecord>(&slice)
                .with_context(|| format!("Error deserializing WAL record for {id:?}"))?;
            if record.seq > after_seq {
                records.push(record);
            }
        }
        records.sort_by_key(|record| record.seq);
        Ok(records)
    }

    async fn discard_wal_after(&self, id: GameId, after_seq: u64) -> Result<u64> {
        let wal = self.wal()?;
        let mut discarded = 0;
        for entry in wal.scan_prefix(id.to_key()).keys() {
            let key = entry?;
            let seq = wal_seq_from_key(&key);
            if seq > after_seq {
                wal.remove(key)?;
                discarded += 1;
            }
        }
        if discarded > 0 {
            self.db.flush_async().await?;
        }
        Ok(discarded)
    }

    async fn probe(&self) -> Result<()> {
        self.meta()?.insert(b"probe", b"ok")?;
        self.db.flush_async().await?;
        Ok(())
    }
}

fn player_key(game_id: GameId, player: PlayerId) -> [u8; 16] {
    let mut key = [0; 16];
    key[..8].copy_from_slice(&game_id.to_key());
    key[8..].copy_from_slice(&player.0.to_be_bytes());
    key
}

fn vote_key(game_id: GameId, round: u32, voter: PlayerId) -> [u8; 20] {
    let mut key = [0; 20];
    key[..8].copy_from_slice(&game_id.to_key());
    key[8..12].copy_from_slice(&round.to_be_bytes());
    key[12..].copy_from_slice(&voter.0.to_be_bytes());
    key
}

fn night_key(game_id: GameId, day: u32, kind: u8, actor: PlayerId) -> [u8; 21] {
    let mut key = [0; 21];
    key[..8].copy_from_slice(&game_id.to_key());
    key[8..12].copy_from_slice(&day.to_be_bytes());
    key[12] = kind;
    key[13..].copy_from_slice(&actor.0.to_be_bytes());
    key
}

fn wal_key(game_id: GameId, seq: u64) -> [u8; 16] {
    let mut key = [0; 16];
    key[..8].copy_from_slice(&game_id.to_key());
    key[8..].copy_from_slice(&seq.to_be_bytes());
    key
}

fn wal_seq_from_key(key: &[u8]) -> u64 {
    let mut seq = [0; 8];
    seq.copy_from_slice(&key[8..16]);
    u64::from_be_bytes(seq)
}

#[cfg(test)]
mod tests {
    use data::config::{EngineConfig, GameRules};
    use data::core::primitives::GuildId;

    use super::*;
    use crate::wal::image_hash;

    fn test_game(id: u64) -> GameState {
        GameState::new(GameId(id), GuildId(1), GameRules::default(), &EngineConfig::default(), 1_000)
    }

    fn test_wal(game_id: GameId, seq: u64) -> WalRecord {
        WalRecord {
            game_id,
            seq,
            verb: "test".into(),
            args: serde_json::Value::Null,
            pre_hash: image_hash(b"pre"),
            post_hash: image_hash(b"post"),
            at_unix_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn commit_then_fetch_roundtrips() {
        let database = SledDatabase::temporary();
        let mut game = test_game(7);
        game.wal_seq = 1;
        let batch = CommitBatch::new(game.clone(), test_wal(game.id, 1));
        database.commit(batch).await.unwrap();

        let loaded = database.fetch_game(GameId(7)).await.unwrap().unwrap();
        assert_eq!(loaded.id, GameId(7));
        assert_eq!(loaded.wal_seq, 1);
        assert_eq!(database.load_all_games().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wal_records_are_ordered_and_discardable() {
        let database = SledDatabase::temporary();
        let game = test_game(9);
        for seq in 1..=3 {
            let mut snapshot = game.clone();
            snapshot.wal_seq = seq;
            database.commit(CommitBatch::new(snapshot, test_wal(game.id, seq))).await.unwrap();
        }

        let records = database.read_wal_since(game.id, 0).await.unwrap();
        assert_eq!(records.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![1, 2, 3]);

        let discarded = database.discard_wal_after(game.id, 1).await.unwrap();
        assert_eq!(discarded, 2);
        let records = database.read_wal_since(game.id, 0).await.unwrap();
        assert_eq!(records.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn delete_game_removes_all_rows() {
        let database = SledDatabase::temporary();
        let game = test_game(11);
        database.commit(CommitBatch::new(game.clone(), test_wal(game.id, 1))).await.unwrap();
        database.delete_game(game.id).await.unwrap();
        assert!(database.fetch_game(game.id).await.unwrap().is_none());
        assert!(database.read_wal_since(game.id, 0).await.unwrap().is_empty());
    }
}
