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

//! Boot-time recovery: rebuild the registry from persisted snapshots, heal
//! torn commits, restore canonical tallies and re-arm timers.

use std::sync::Arc;

use color_eyre::Result;
use data::game_states::game_state::GameState;
use data::game_states::night_state::NightAction;
use data::game_states::phase::Phase;
use tracing::{info, warn};

use crate::atomic::now_unix_ms;
use crate::engine::Engine;
use crate::game_actor::GameMessage;

/// Loads every persisted game into the registry. Returns how many were
/// recovered.
pub async fn run(engine: &Engine) -> Result<usize> {
    let shared = engine.shared();
    let games = shared.database.load_all_games().await?;
    let mut recovered = 0;

    for mut game in games {
        let game_id = game.id;

        // A crash between the ENDED commit and teardown leaves a corpse.
        if game.phase == Phase::Ended {
            info!(?game_id, "Deleting game that ended before the last shutdown");
            shared.database.delete_game(game_id).await?;
            continue;
        }

        // A WAL record newer than the snapshot is a torn commit: the store
        // transaction never landed, so the record never happened.
        let discarded = shared.database.discard_wal_after(game_id, game.wal_seq).await?;
        if discarded > 0 {
            warn!(?game_id, discarded, "Discarded orphan WAL records");
        }

        rebuild_tallies(engine, &mut game).await?;
        game.pending_events.clear();
        game.pending_cleared_rounds.clear();

        let timer = game.active_timer;
        shared.registry.publish(Arc::new(game));
        engine.spawn_actor(game_id);
        recovered += 1;

        // Re-arm the persisted deadline; an elapsed one fires immediately.
        if let Some(timer) = timer {
            let Some(mailbox) = shared.registry.handle(game_id) else { continue };
            let now = now_unix_ms();
            if timer.deadline_unix_ms <= now {
                info!(?game_id, "Recovered timer already elapsed; resolving now");
                let _ = mailbox.send(GameMessage::TimerFired { epoch: timer.epoch }).await;
            } else {
                shared.timers.sync(game_id, Some(timer), mailbox, now);
            }
        }
    }

    Ok(recovered)
}

/// The vote and night-action tables are canonical; the snapshot's in-memory
/// tallies are overlaid from them.
async fn rebuild_tallies(engine: &Engine, game: &mut GameState) -> Result<()> {
    let database = &engine.shared().database;

    let open_rounds: Vec<u32> = [&game.votes.captain, &game.votes.lynch, &game.votes.wolves]
        .into_iter()
        .flatten()
        .map(|ballots| ballots.round)
        .collect();
    for round in open_rounds {
        let rows = database.load_votes(game.id, round).await?;
        for ballots in [&mut game.votes.captain, &mut game.votes.lynch, &mut game.votes.wolves]
            .into_iter()
            .flatten()
        {
            if ballots.round == round {
                ballots.by_voter = rows.iter().map(|row| (row.voter, row.candidate)).collect();
            }
        }
    }

    let rows = database.load_night_actions(game.id, game.day_count).await?;
    if !rows.is_empty() {
        game.night.actions = rows
            .into_iter()
            .map(|row| NightAction {
                day: row.day,
                kind: row.kind,
                actor: row.actor,
                target: row.target,
                created_at_unix_ms: row.created_at_unix_ms,
            })
            .collect();
    }

    Ok(())
}
