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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use color_eyre::Result;
use dashmap::DashMap;
use data::actions::admin_action::AdminAction;
use data::actions::intent::{ActorRef, GameRef, Intent, IntentVerb};
use data::actions::lobby_action::LobbyAction;
use data::config::{EngineConfig, GameRules};
use data::core::primitives::{GameId, GuildId, PlayerId};
use data::core::roles::Role;
use data::events::EventEnvelope;
use data::game_states::game_state::{GameChannels, GameState};
use data::game_states::timer_state::TimerKind;
use database::database::Database;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::info;
use utils::outcome::Reject;

use crate::atomic::{self, CircuitBreaker};
use crate::event_bus::EventBus;
use crate::game_actor::{self, GameMessage};
use crate::recovery;
use crate::registry::{DuplicateGuard, Registry};
use crate::timers::TimerService;

/// Tagged result of one submitted intent, surfaced to presenters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentReply {
    Ok,
    /// A precondition failed; nothing changed. The [Reject] code is stable
    /// wire vocabulary.
    Rejected(Reject),
    /// An internal or storage failure; the game's prior state is preserved.
    Failed(String),
}

impl IntentReply {
    pub fn is_ok(&self) -> bool {
        matches!(self, IntentReply::Ok)
    }

    pub fn reject_code(&self) -> Option<&'static str> {
        match self {
            IntentReply::Rejected(reject) => Some(reject.code()),
            _ => None,
        }
    }
}

/// Read-only timer view, part of the snapshot surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerInfo {
    pub kind: TimerKind,
    pub remaining_ms: u64,
    pub total_ms: u64,
}

/// Everything the mutating path needs, shared between the façade, the
/// per-game actors and background tasks.
pub struct EngineShared {
    pub config: EngineConfig,
    pub database: Arc<dyn Database>,
    pub registry: Registry,
    pub bus: EventBus,
    pub timers: TimerService,
    pub breaker: CircuitBreaker,
    pub dedupe: DuplicateGuard,
    pub ready: AtomicBool,
}

/// The engine façade presenters talk to.
///
/// Lifecycle is explicit: [Engine::new], [Engine::start] (recovery),
/// [Engine::shutdown]. One engine instance owns every game it serves; there
/// is no cross-process coordination.
pub struct Engine {
    shared: Arc<EngineShared>,
    actors: DashMap<GameId, JoinHandle<()>>,
}

impl Engine {
    pub fn new(config: EngineConfig, database: Arc<dyn Database>) -> Self {
        let dedupe = DuplicateGuard::new(config.duplicate_intent_window_ms);
        Self {
            shared: Arc::new(EngineShared {
                config,
                database,
                registry: Registry::default(),
                bus: EventBus::new(),
                timers: TimerService::default(),
                breaker: CircuitBreaker::default(),
                dedupe,
                ready: AtomicBool::new(false),
            }),
            actors: DashMap::new(),
        }
    }

    /// Rebuilds the registry from the store and re-arms timers. Must be
    /// called once before serving intents.
    pub async fn start(&self) -> Result<()> {
        let recovered = recovery::run(self).await?;
        self.shared.ready.store(true, Ordering::Release);
        info!(recovered, "Engine ready");
        Ok(())
    }

    /// Drains mailboxes, cancels timers and stops accepting work. Committed
    /// state is already durable; anything in flight after the drain is
    /// re-derivable on the next boot.
    pub async fn shutdown(&self) {
        self.shared.ready.store(false, Ordering::Release);
        // Armed timer tasks hold mailbox senders; cancel them first so
        // dropping the handles actually drains the actors.
        self.shared.timers.cancel_all();
        self.shared.registry.clear_handles();
        let ids: Vec<GameId> = self.actors.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, join)) = self.actors.remove(&id) {
                let _ = join.await;
            }
        }
        info!("Engine stopped");
    }

    pub async fn create_game(
        &self,
        game_id: GameId,
        guild_id: GuildId,
        rules: Option<GameRules>,
    ) -> IntentReply {
        if self.shared.registry.contains(game_id) {
            return IntentReply::Rejected(Reject::GameExists);
        }
        let rules = rules.unwrap_or(self.shared.config.rules);
        let reply = atomic::create_game(&self.shared, game_id, guild_id, rules).await;
        if reply.is_ok() {
            self.spawn_actor(game_id);
        }
        reply
    }

    /// Submits one intent for sequential execution by the game's actor.
    pub async fn submit(&self, intent: Intent) -> IntentReply {
        let Some(game_id) = self.shared.registry.resolve(intent.game) else {
            return IntentReply::Rejected(Reject::NotInGame);
        };
        let verb_name = intent.verb.name();

        if let Some(seq) = intent.client_seq {
            if let Some(cached) =
                self.shared.dedupe.check(game_id, intent.actor.id, verb_name, seq)
            {
                return cached;
            }
        }

        let Some(handle) = self.shared.registry.handle(game_id) else {
            return IntentReply::Rejected(Reject::NotInGame);
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        let message =
            GameMessage::Intent { actor: intent.actor, verb: intent.verb, reply: reply_tx };
        if handle.try_send(message).is_err() {
            return IntentReply::Rejected(Reject::Busy);
        }

        let reply = match reply_rx.await {
            Ok(reply) => reply,
            Err(_) => IntentReply::Failed("engine shutting down".into()),
        };
        if let Some(seq) = intent.client_seq {
            self.shared.dedupe.record(game_id, intent.actor.id, verb_name, seq, reply.clone());
        }
        reply
    }

    /// Stores the channels the presentation layer provisioned for a game
    /// and indexes them for reverse lookup.
    pub async fn provision_channels(
        &self,
        game_id: GameId,
        channels: GameChannels,
    ) -> IntentReply {
        let Some(handle) = self.shared.registry.handle(game_id) else {
            return IntentReply::Rejected(Reject::NotInGame);
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        if handle.try_send(GameMessage::Provision { channels, reply: reply_tx }).is_err() {
            return IntentReply::Rejected(Reject::Busy);
        }
        reply_rx.await.unwrap_or(IntentReply::Failed("engine shutting down".into()))
    }

    /// Read-only consistent snapshot of a game.
    pub fn snapshot(&self, game_ref: GameRef) -> Option<Arc<GameState>> {
        let game_id = self.shared.registry.resolve(game_ref)?;
        self.shared.registry.snapshot(game_id)
    }

    pub fn timer_info(&self, game_ref: GameRef) -> Option<TimerInfo> {
        let snapshot = self.snapshot(game_ref)?;
        let timer = snapshot.active_timer?;
        Some(TimerInfo {
            kind: timer.kind,
            remaining_ms: timer.remaining_ms(atomic::now_unix_ms()),
            total_ms: timer.total_ms,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.shared.bus.subscribe()
    }

    // Convenience wrappers over [Engine::submit] for the common verbs.

    pub async fn join_lobby(
        &self,
        game_id: GameId,
        user: PlayerId,
        username: impl Into<String>,
    ) -> IntentReply {
        self.submit(Intent::new(
            GameRef::Game(game_id),
            ActorRef { id: user, admin: false },
            IntentVerb::Lobby(LobbyAction::Join { username: username.into(), fake: false }),
        ))
        .await
    }

    pub async fn leave_lobby(&self, game_id: GameId, user: PlayerId) -> IntentReply {
        self.submit(Intent::new(
            GameRef::Game(game_id),
            ActorRef { id: user, admin: false },
            IntentVerb::Lobby(LobbyAction::Leave),
        ))
        .await
    }

    pub async fn start_game(
        &self,
        game_id: GameId,
        user: PlayerId,
        role_pool: Vec<Role>,
    ) -> IntentReply {
        self.submit(Intent::new(
            GameRef::Game(game_id),
            ActorRef { id: user, admin: false },
            IntentVerb::Lobby(LobbyAction::Start { role_pool }),
        ))
        .await
    }

    pub async fn end_game(&self, game_id: GameId, actor: ActorRef) -> IntentReply {
        self.submit(Intent::new(
            GameRef::Game(game_id),
            actor,
            IntentVerb::Admin(AdminAction::EndGame),
        ))
        .await
    }

    pub async fn force_end(&self, game_id: GameId, actor: ActorRef) -> IntentReply {
        self.submit(Intent::new(
            GameRef::Game(game_id),
            actor,
            IntentVerb::Admin(AdminAction::ForceEnd),
        ))
        .await
    }

    /// Recovery has finished and intents are being served.
    pub fn ready(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire)
    }

    /// Ready, and the storage circuit is closed.
    pub fn healthy(&self) -> bool {
        self.ready() && !self.shared.breaker.is_open()
    }

    pub(crate) fn shared(&self) -> &Arc<EngineShared> {
        &self.shared
    }

    pub(crate) fn spawn_actor(&self, game_id: GameId) {
        let (handle, join) = game_actor::spawn(Arc::clone(&self.shared), game_id);
        self.shared.registry.install_handle(game_id, handle);
        self.actors.insert(game_id, join);
    }
}
