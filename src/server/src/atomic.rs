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

//! The atomic mutator: deep-clone, mutate, journal, commit, pointer-swap,
//! post-commit hooks. The sole writer of game state.
//!
//! Crash-safety boundary: everything up to the store commit is lost on a
//! crash and re-derivable afterwards; the WAL record and the snapshot land
//! in one store transaction, so recovery can treat any WAL entry newer than
//! its snapshot as torn and discard it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use data::actions::intent::{ActorRef, IntentVerb};
use data::config::GameRules;
use data::core::primitives::{GameId, GuildId};
use data::game_states::game_state::{GameChannels, GameState};
use data::game_states::phase::Phase;
use database::database::{CommitBatch, NightActionRow, VoteRow};
use database::wal::{image_hash, WalRecord};
use rules::action_handlers::actions;
use rules::resolvers::votes;
use rules::steps::step;
use tracing::{debug, error, warn};
use utils::outcome::{Outcome, Reject, StopCondition};

use crate::engine::{EngineShared, IntentReply};

const COMMIT_ATTEMPTS: u32 = 3;
const COMMIT_BACKOFF: Duration = Duration::from_millis(50);
const BREAKER_THRESHOLD: u32 = 3;
const PROBE_INTERVAL: Duration = Duration::from_secs(1);

pub fn now_unix_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Trips open after repeated store failures; while open, every write is
/// short-circuited with `storage_unavailable` until a probe write succeeds.
#[derive(Default)]
pub struct CircuitBreaker {
    open: AtomicBool,
    consecutive_failures: AtomicU32,
}

impl CircuitBreaker {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Records a failure; returns true when this one trips the breaker.
    fn record_failure(&self) -> bool {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        if failures >= BREAKER_THRESHOLD && !self.open.swap(true, Ordering::AcqRel) {
            return true;
        }
        false
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
    }

    fn close(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
        self.open.store(false, Ordering::Release);
    }
}

/// Runs one intent inside the game's atomic bracket.
pub async fn run_intent(
    shared: &Arc<EngineShared>,
    game_id: GameId,
    actor: ActorRef,
    verb: &IntentVerb,
) -> IntentReply {
    let args = serde_json::to_value(verb).unwrap_or(serde_json::Value::Null);
    run_atomic(shared, game_id, verb.name(), args, |game| actions::execute(game, actor, verb))
        .await
}

/// Resolves an AFK timeout, unless the arm generation has moved on (a late
/// or duplicate fire), in which case this is a no-op.
pub async fn run_timeout(shared: &Arc<EngineShared>, game_id: GameId, epoch: u64) {
    let Some(snapshot) = shared.registry.snapshot(game_id) else { return };
    if snapshot.active_timer.map(|timer| timer.epoch) != Some(epoch) {
        debug!(?game_id, epoch, "Ignoring stale timer fire");
        return;
    }
    let reply = run_atomic(
        shared,
        game_id,
        "timeout",
        serde_json::json!({ "epoch": epoch }),
        step::resolve_current,
    )
    .await;
    if let IntentReply::Failed(reason) = reply {
        error!(?game_id, reason, "Timeout resolution failed");
    }
}

/// Stores the provisioned secondary channels on the game; the registry's
/// reverse index picks them up at publication.
pub async fn run_provision(
    shared: &Arc<EngineShared>,
    game_id: GameId,
    channels: GameChannels,
) -> IntentReply {
    let args = serde_json::to_value(channels).unwrap_or(serde_json::Value::Null);
    run_atomic(shared, game_id, "provision_channels", args, move |game| {
        game.channels = channels;
        Ok(())
    })
    .await
}

/// Creates and persists a fresh LOBBY game. The caller spawns its actor
/// once this returns ok.
pub async fn create_game(
    shared: &Arc<EngineShared>,
    game_id: GameId,
    guild_id: GuildId,
    rules: GameRules,
) -> IntentReply {
    let mut game = GameState::new(game_id, guild_id, rules, &shared.config, now_unix_ms());
    game.wal_seq = 1;
    let bytes = match serde_json::to_vec(&game) {
        Ok(bytes) => bytes,
        Err(error) => return IntentReply::Failed(error.to_string()),
    };
    let wal = WalRecord {
        game_id,
        seq: 1,
        verb: "create_game".into(),
        args: serde_json::json!({ "guild_id": guild_id.0 }),
        pre_hash: String::new(),
        post_hash: image_hash(&bytes),
        at_unix_ms: game.now_unix_ms,
    };

    let batch = CommitBatch::new(game.clone(), wal);
    if let Err(error) = commit_with_retry(shared, batch).await {
        return error;
    }
    shared.registry.publish(Arc::new(game));
    IntentReply::Ok
}

/// The §4.5 bracket: clone, mutate, journal, commit, swap, hooks.
pub async fn run_atomic(
    shared: &Arc<EngineShared>,
    game_id: GameId,
    verb: &str,
    args: serde_json::Value,
    mutator: impl FnOnce(&mut GameState) -> Outcome,
) -> IntentReply {
    if shared.breaker.is_open() {
        return IntentReply::Rejected(Reject::StorageUnavailable);
    }
    let Some(current) = shared.registry.snapshot(game_id) else {
        return IntentReply::Rejected(Reject::NotInGame);
    };

    // Working copy; the registry keeps serving the old snapshot until the
    // commit lands.
    let mut working = (*current).clone();
    working.now_unix_ms = now_unix_ms();
    working.pending_events.clear();
    working.pending_cleared_rounds.clear();

    match mutator(&mut working) {
        Ok(()) | Err(StopCondition::GameOver) => {}
        Err(StopCondition::Reject(reject)) => {
            debug!(?game_id, verb, %reject, "Intent rejected");
            return IntentReply::Rejected(reject);
        }
        Err(StopCondition::Error(report)) => {
            // Engine bug: abandon the working copy, keep serving the prior
            // state, keep the game alive.
            error!(?game_id, verb, ?report, "Mutation failed; state preserved");
            return IntentReply::Failed(report.to_string());
        }
    }

    let pre_bytes = match serde_json::to_vec(&*current) {
        Ok(bytes) => bytes,
        Err(error) => return IntentReply::Failed(error.to_string()),
    };
    working.wal_seq = current.wal_seq + 1;
    let post_bytes = match serde_json::to_vec(&working) {
        Ok(bytes) => bytes,
        Err(error) => return IntentReply::Failed(error.to_string()),
    };

    let wal = WalRecord {
        game_id,
        seq: working.wal_seq,
        verb: verb.to_string(),
        args,
        pre_hash: image_hash(&pre_bytes),
        post_hash: image_hash(&post_bytes),
        at_unix_ms: working.now_unix_ms,
    };

    let mut batch = CommitBatch::new(working.clone(), wal);
    batch.cleared_vote_rounds = working.pending_cleared_rounds.clone();
    batch.votes = open_vote_rows(&working);
    batch.night_actions = night_action_rows(&working);
    batch.removed_players = current
        .players
        .iter()
        .filter(|player| working.player(player.id).is_none())
        .map(|player| player.id)
        .collect();

    if let Err(error) = commit_with_retry(shared, batch).await {
        return error;
    }

    // Post-commit: pointer swap, then hooks. Hooks never mutate the game.
    let events = std::mem::take(&mut working.pending_events);
    working.pending_cleared_rounds.clear();
    let at_unix_ms = working.now_unix_ms;
    let ended = working.phase == Phase::Ended;
    let timer = working.active_timer;

    shared.registry.publish(Arc::new(working));
    shared.bus.publish_turn(game_id, at_unix_ms, events);

    if ended {
        teardown(shared, game_id).await;
    } else if let Some(mailbox) = shared.registry.handle(game_id) {
        shared.timers.sync(game_id, timer, mailbox, at_unix_ms);
    }

    IntentReply::Ok
}

async fn teardown(shared: &Arc<EngineShared>, game_id: GameId) {
    debug!(?game_id, "Tearing down ended game");
    shared.timers.cancel(game_id);
    shared.registry.remove(game_id);
    if let Err(error) = shared.database.delete_game(game_id).await {
        warn!(?game_id, ?error, "Failed to delete ended game from the store");
    }
}

async fn commit_with_retry(
    shared: &Arc<EngineShared>,
    batch: CommitBatch,
) -> Result<(), IntentReply> {
    let game_id = batch.game.id;
    for attempt in 1..=COMMIT_ATTEMPTS {
        match shared.database.commit(batch.clone()).await {
            Ok(()) => {
                shared.breaker.record_success();
                return Ok(());
            }
            Err(error) if attempt < COMMIT_ATTEMPTS => {
                warn!(?game_id, attempt, ?error, "Store commit failed; retrying");
                tokio::time::sleep(COMMIT_BACKOFF * attempt).await;
            }
            Err(error) => {
                error!(?game_id, ?error, "Store commit failed; giving up");
                if shared.breaker.record_failure() {
                    spawn_probe(Arc::clone(shared));
                }
                return Err(IntentReply::Rejected(Reject::StorageUnavailable));
            }
        }
    }
    unreachable!("commit retry loop always returns")
}

/// Background probe that closes the breaker once the store answers again.
fn spawn_probe(shared: Arc<EngineShared>) {
    warn!("Storage circuit breaker opened");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(PROBE_INTERVAL).await;
            if shared.database.probe().await.is_ok() {
                shared.breaker.close();
                warn!("Storage circuit breaker closed");
                return;
            }
        }
    });
}

fn open_vote_rows(game: &GameState) -> Vec<VoteRow> {
    let mut rows = Vec::new();
    for ballots in [&game.votes.captain, &game.votes.lynch, &game.votes.wolves]
        .into_iter()
        .flatten()
    {
        for (&voter, &candidate) in &ballots.by_voter {
            rows.push(VoteRow {
                round: ballots.round,
                voter,
                candidate,
                weight: votes::ballot_weight(game, ballots.kind, voter),
            });
        }
    }
    rows
}

fn night_action_rows(game: &GameState) -> Vec<NightActionRow> {
    game.night
        .actions
        .iter()
        .map(|action| NightActionRow {
            day: action.day,
            kind: action.kind,
            actor: action.actor,
            target: action.target,
            created_at_unix_ms: action.created_at_unix_ms,
        })
        .collect()
}
