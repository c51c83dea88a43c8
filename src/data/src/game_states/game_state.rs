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

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, GameRules, Timeouts};
use crate::core::primitives::{ChannelId, GameId, GuildId, PlayerId};
use crate::core::roles::Role;
use crate::events::{GameEvent, Victory};
use crate::game_states::history::{ActionLog, LogEntry};
use crate::game_states::night_state::{NightState, WitchPotions};
use crate::game_states::phase::{Phase, SubPhase};
use crate::game_states::timer_state::ActiveTimer;
use crate::game_states::vote_state::VoteLedger;
use crate::player_states::player_state::PlayerState;

/// This is the state of a single ongoing match (one village, not the whole
/// engine process).
///
/// The game owns its players as an arena `Vec`; every cross-reference
/// (lovers, captain, votes, kill targets) is a [PlayerId], never a pointer.
/// The struct is the unit of atomic mutation: the mutator deep-clones it,
/// applies one change, journals it and swaps the pointer in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Unique ID for this game; doubles as the main channel id.
    pub id: GameId,

    /// Tenant the game belongs to.
    pub guild_id: GuildId,

    pub phase: Phase,

    /// Always a legal sub-phase of `phase`.
    pub sub_phase: SubPhase,

    /// Number of completed dawns. Zero during the first night.
    pub day_count: u32,

    /// Join order, fixed at game start.
    pub players: Vec<PlayerState>,

    /// Ids of players with `alive == false`, in death order. Derived from
    /// `players` but kept for stable iteration.
    pub dead: Vec<PlayerId>,

    /// Elected captain, if any. His lynch ballot counts double.
    pub captain: Option<PlayerId>,

    /// At most one unordered pair, designated by Cupid on night one.
    pub lovers: Option<(PlayerId, PlayerId)>,

    pub night: NightState,

    pub witch_potions: WitchPotions,

    /// The two leftover roles offered to the Thief on night one. Emptied
    /// after the choice (or after the THIEF step is skipped).
    pub thief_extra_roles: Vec<Role>,

    /// True once the Ancien has survived one wolf attack.
    pub ancien_hit: bool,

    /// True once the village itself eliminated the Ancien; all
    /// village-aligned role powers are disabled from then on.
    pub village_roles_powerless: bool,

    pub votes: VoteLedger,

    pub rules: GameRules,

    /// AFK durations, stamped from engine config at creation so scheduling
    /// stays a pure function of game state.
    pub timeouts: Timeouts,

    /// Testing aid: sub-phases whose only live actors are fake participants
    /// resolve immediately as if their timeout fired.
    pub skip_fake_phases: bool,

    /// Upper bound on `action_log`, copied from engine config at creation.
    pub action_log: ActionLog,

    /// Secondary channels provisioned for this game. The registry keeps a
    /// reverse index over these.
    pub channels: GameChannels,

    pub started_at_unix_ms: Option<u64>,
    pub last_phase_change_unix_ms: u64,

    /// The single armed deadline, if any (rescheduling cancels the
    /// predecessor). Persisted so recovery can re-arm it.
    pub active_timer: Option<ActiveTimer>,

    /// Generation counter for timer arms; stale fires are ignored.
    pub timer_epoch: u64,

    /// Pending hunter shot opened by a Hunter death, with the sub-phase to
    /// resume once the shot lands.
    pub hunter_shoot: Option<HunterShootState>,

    /// Hunters who died in the current death cascade and still owe a shot.
    /// Drained by the scheduler into `hunter_shoot`.
    pub pending_hunters: Vec<PlayerId>,

    /// Set exactly once, by the transition to ENDED.
    pub victory: Option<Victory>,

    /// Sequence number of the last WAL record committed for this game.
    pub wal_seq: u64,

    /// Wall clock observed at the start of the current mutation. Handlers
    /// read time from here so a mutation is a pure function of its inputs.
    pub now_unix_ms: u64,

    /// Deterministic per-game random number generator, seeded from the game
    /// id at creation.
    pub rng: Xoshiro256StarStar,

    /// Events produced by the current mutation, published by the mutator
    /// after the commit succeeds. Never persisted.
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,

    /// Vote rounds closed by the current mutation whose store rows should be
    /// dropped at commit time. Never persisted.
    #[serde(skip)]
    pub pending_cleared_rounds: Vec<u32>,
}

/// A Hunter died and must shoot before the schedule continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunterShootState {
    pub shooter: PlayerId,
    /// Sub-phase the scheduler returns to once the shot lands.
    pub resume: SubPhase,
}

/// Secondary channels provisioned for a game by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameChannels {
    pub wolves: Option<ChannelId>,
    pub witch: Option<ChannelId>,
    pub seer: Option<ChannelId>,
    pub petite_fille: Option<ChannelId>,
    pub cupid: Option<ChannelId>,
    pub salvateur: Option<ChannelId>,
    pub thief: Option<ChannelId>,
}

impl GameChannels {
    pub fn iter(&self) -> impl Iterator<Item = ChannelId> {
        [
            self.wolves,
            self.witch,
            self.seer,
            self.petite_fille,
            self.cupid,
            self.salvateur,
            self.thief,
        ]
        .into_iter()
        .flatten()
    }
}

impl GameState {
    /// Creates a new game in LOBBY.
    pub fn new(
        id: GameId,
        guild_id: GuildId,
        rules: GameRules,
        config: &EngineConfig,
        now_unix_ms: u64,
    ) -> Self {
        Self {
            id,
            guild_id,
            phase: Phase::Lobby,
            sub_phase: SubPhase::Lobby,
            day_count: 0,
            players: Vec::new(),
            dead: Vec::new(),
            captain: None,
            lovers: None,
            night: NightState::default(),
            witch_potions: WitchPotions::default(),
            thief_extra_roles: Vec::new(),
            ancien_hit: false,
            village_roles_powerless: false,
            votes: VoteLedger::default(),
            rules,
            timeouts: config.timeouts,
            skip_fake_phases: config.skip_fake_phases,
            action_log: ActionLog::new(config.max_history),
            channels: GameChannels::default(),
            started_at_unix_ms: None,
            last_phase_change_unix_ms: now_unix_ms,
            active_timer: None,
            timer_epoch: 0,
            hunter_shoot: None,
            pending_hunters: Vec::new(),
            victory: None,
            wal_seq: 0,
            now_unix_ms,
            rng: Xoshiro256StarStar::seed_from_u64(id.0),
            pending_events: Vec::new(),
            pending_cleared_rounds: Vec::new(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(|p| p.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// The living bearer of `role`, if any.
    pub fn alive_with_role(&self, role: Role) -> Option<&PlayerState> {
        self.alive_players().find(|p| p.role == Some(role))
    }

    pub fn alive_wolves(&self) -> impl Iterator<Item = &PlayerState> {
        self.alive_players().filter(|p| p.is_wolf())
    }

    /// The partner of `player` if the lovers pair includes them.
    pub fn lover_of(&self, player: PlayerId) -> Option<PlayerId> {
        match self.lovers {
            Some((a, b)) if a == player => Some(b),
            Some((a, b)) if b == player => Some(a),
            _ => None,
        }
    }

    /// Queues an event for publication after the enclosing mutation commits.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Appends to the action log and queues the matching `actionLog` event.
    pub fn log_action(&mut self, message: impl Into<String>) {
        let entry = LogEntry {
            at_unix_ms: self.now_unix_ms,
            day: self.day_count,
            message: message.into(),
        };
        self.action_log.push(entry.clone());
        self.push_event(GameEvent::ActionLog { entry });
    }

    /// Records a phase change, stamping the transition time.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.last_phase_change_unix_ms = self.now_unix_ms;
        self.push_event(GameEvent::PhaseChanged { phase, day: self.day_count });
    }

    pub fn set_sub_phase(&mut self, sub_phase: SubPhase) {
        self.sub_phase = sub_phase;
        self.push_event(GameEvent::SubPhaseChanged { sub_phase });
    }

    /// Arms the game's single AFK timer, cancelling any predecessor.
    pub fn arm_timer(&mut self, kind: crate::game_states::timer_state::TimerKind, total_ms: u64) {
        self.timer_epoch += 1;
        self.active_timer = Some(ActiveTimer {
            kind,
            deadline_unix_ms: self.now_unix_ms + total_ms,
            total_ms,
            epoch: self.timer_epoch,
        });
    }

    pub fn clear_timer(&mut self) {
        self.timer_epoch += 1;
        self.active_timer = None;
    }
}
