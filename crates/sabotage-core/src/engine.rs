//! Session controller

use chrono::{DateTime, Local};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sabotage_api::{Command, SessionSnapshot, API_VERSION};
use sabotage_config::GameConfig;
use sabotage_util::{
    ChoreId, ClientId, MeetingId, MonotonicInstant, PlayerId, Result, SabotageError,
};
use tracing::{debug, info};

use crate::{assign_chores, assign_impostors, evaluate, CoreEvent, Meetings, Roster, Timer};

/// The authoritative game session
///
/// Owns every piece of session state. Each operation returns the events the
/// service must deliver; nothing here performs I/O or reads timers on its
/// own. Requests whose preconditions do not hold return no events.
pub struct CoreEngine {
    config: GameConfig,
    rng: StdRng,
    roster: Roster,
    meetings: Meetings,
    started: bool,
    chores_completed: u32,
    chores_generated: u32,
    started_at: Option<DateTime<Local>>,
    last_meeting_at: Option<DateTime<Local>>,
}

impl CoreEngine {
    /// Create an engine drawing randomness from `rng`
    pub fn new(config: GameConfig, rng: StdRng) -> Self {
        info!(
            max_players = config.max_players,
            chore_win_threshold = config.chore_win_threshold,
            "Core engine initialized"
        );

        Self {
            roster: Roster::new(config.max_players),
            config,
            rng,
            meetings: Meetings::new(),
            started: false,
            chores_completed: 0,
            chores_generated: 0,
            started_at: None,
            last_meeting_at: None,
        }
    }

    /// Create an engine seeded from the operating system
    pub fn with_entropy(config: GameConfig) -> Self {
        Self::new(config, StdRng::from_os_rng())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn meetings(&self) -> &Meetings {
        &self.meetings
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn chores_completed(&self) -> u32 {
        self.chores_completed
    }

    pub fn chores_generated(&self) -> u32 {
        self.chores_generated
    }

    /// Dispatch a client command
    pub fn apply(&mut self, client_id: &ClientId, command: Command) -> Vec<CoreEvent> {
        match command {
            Command::JoinGame { player_name } => self.join(client_id.clone(), player_name),
            Command::StartGame => self.start(),
            Command::CompleteTask { player_id, task_id } => {
                self.complete_chore(player_id, task_id)
            }
            Command::CallMeeting { player_id } => self.call_meeting(player_id),
            Command::CastVote {
                voter_id,
                target_id,
            } => self.cast_vote(voter_id, target_id),
        }
    }

    /// Add a player for `client_id`
    pub fn join(&mut self, client_id: ClientId, name: String) -> Vec<CoreEvent> {
        let player = match self.roster.add(name, client_id.clone()) {
            Ok(player) => player.to_view(),
            Err(e) if e.is_reported() => {
                info!(client_id = %client_id, error = %e, "Join rejected");
                return vec![CoreEvent::JoinRejected {
                    client_id,
                    reason: e.to_string(),
                }];
            }
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "Ignoring join");
                return Vec::new();
            }
        };

        info!(
            player_id = %player.id,
            client_id = %client_id,
            players = self.roster.len(),
            "Player joined"
        );

        vec![
            CoreEvent::PlayerJoined { client_id, player },
            CoreEvent::RosterChanged {
                players: self.roster.views(),
            },
        ]
    }

    /// Assign roles and chores and start the game
    pub fn start(&mut self) -> Vec<CoreEvent> {
        ignored("start", self.try_start())
    }

    fn try_start(&mut self) -> Result<Vec<CoreEvent>> {
        if self.started {
            return Err(SabotageError::AlreadyStarted);
        }

        let impostors = assign_impostors(&mut self.roster, &mut self.rng)?;
        self.chores_generated += assign_chores(&mut self.roster, &mut self.rng);
        self.started = true;
        self.started_at = Some(sabotage_util::now());
        let timer = self.meetings.begin_cooldown();

        info!(
            players = self.roster.len(),
            chores = self.chores_generated,
            "Game started"
        );
        debug!(impostors = ?impostors, "Impostors assigned");

        Ok(vec![
            CoreEvent::ScheduleTimer {
                timer,
                after: self.config.meeting_initial_delay,
            },
            CoreEvent::GameStarted {
                snapshot: self.snapshot(),
            },
        ])
    }

    /// Mark one of a player's chores as done
    pub fn complete_chore(&mut self, player_id: PlayerId, chore_id: ChoreId) -> Vec<CoreEvent> {
        ignored("complete_chore", self.try_complete_chore(player_id, chore_id))
    }

    fn try_complete_chore(
        &mut self,
        player_id: PlayerId,
        chore_id: ChoreId,
    ) -> Result<Vec<CoreEvent>> {
        let chore = self
            .roster
            .find_mut(player_id)
            .ok_or(SabotageError::PlayerNotFound(player_id))?
            .chore_mut(chore_id)
            .ok_or(SabotageError::ChoreNotFound(chore_id))?;

        if !chore.mark_completed() {
            return Err(SabotageError::ChoreAlreadyCompleted(chore_id));
        }
        self.chores_completed += 1;

        debug!(
            player_id = %player_id,
            chore_id = %chore_id,
            total = self.chores_completed,
            "Chore completed"
        );

        let mut events = vec![CoreEvent::ChoreCompleted {
            player_id,
            chore_id,
        }];
        events.extend(self.check_win());
        Ok(events)
    }

    /// Call a meeting on behalf of `player_id`
    pub fn call_meeting(&mut self, player_id: PlayerId) -> Vec<CoreEvent> {
        ignored("call_meeting", self.try_call_meeting(player_id))
    }

    fn try_call_meeting(&mut self, player_id: PlayerId) -> Result<Vec<CoreEvent>> {
        self.require_living(player_id)?;

        let now = sabotage_util::now();
        let meeting_id = self
            .meetings
            .call(player_id, now, MonotonicInstant::now())?;
        self.last_meeting_at = Some(now);

        info!(meeting_id = %meeting_id, called_by = %player_id, "Meeting called");

        Ok(vec![
            CoreEvent::MeetingCalled {
                meeting_id,
                called_by: player_id,
            },
            CoreEvent::ScheduleTimer {
                timer: Timer::VoteDeadline { meeting_id },
                after: self.config.meeting_duration,
            },
        ])
    }

    /// Record a vote; resolves the meeting once every living player voted
    pub fn cast_vote(&mut self, voter_id: PlayerId, target_id: PlayerId) -> Vec<CoreEvent> {
        ignored("cast_vote", self.try_cast_vote(voter_id, target_id))
    }

    fn try_cast_vote(&mut self, voter_id: PlayerId, target_id: PlayerId) -> Result<Vec<CoreEvent>> {
        let meeting_id = self
            .meetings
            .active()
            .map(|m| m.meeting_id)
            .ok_or(SabotageError::NoMeetingInProgress)?;
        self.require_living(voter_id)?;
        self.require_living(target_id)?;

        let cast = self.meetings.vote(voter_id, target_id)?;
        debug!(voter = %voter_id, target = %target_id, cast, "Vote recorded");

        if cast >= self.roster.living_count() {
            return self.resolve_meeting(meeting_id);
        }
        Ok(Vec::new())
    }

    /// Drop the player bound to a closed connection
    pub fn disconnect(&mut self, client_id: &ClientId) -> Vec<CoreEvent> {
        let Some(player) = self.roster.remove_client(client_id) else {
            debug!(client_id = %client_id, "Disconnect without a player");
            return Vec::new();
        };

        self.meetings.forget_voter(player.id);
        info!(
            player_id = %player.id,
            client_id = %client_id,
            players = self.roster.len(),
            "Player left"
        );

        vec![CoreEvent::RosterChanged {
            players: self.roster.views(),
        }]
    }

    /// Handle a timer scheduled by an earlier [`CoreEvent::ScheduleTimer`]
    pub fn fire_timer(&mut self, timer: Timer) -> Vec<CoreEvent> {
        match timer {
            Timer::CooldownElapsed { token } => {
                ignored("cooldown_elapsed", self.meetings.end_cooldown(token).map(|()| {
                    info!(token = %token, "Meetings open");
                    Vec::new()
                }))
            }
            Timer::VoteDeadline { meeting_id } => {
                ignored("vote_deadline", self.resolve_meeting(meeting_id))
            }
        }
    }

    fn resolve_meeting(&mut self, meeting_id: MeetingId) -> Result<Vec<CoreEvent>> {
        let meeting = self.meetings.finish(meeting_id)?;
        let mut events = Vec::new();

        let ejected = meeting
            .ballot
            .leader()
            .and_then(|target| self.roster.find_mut(target))
            .map(|player| {
                player.is_alive = false;
                (player.id, player.is_impostor)
            });

        if let Some((player_id, was_impostor)) = ejected {
            info!(player_id = %player_id, was_impostor, "Player ejected");
            events.push(CoreEvent::PlayerEjected {
                player_id,
                was_impostor,
            });
        }

        let timer = self.meetings.begin_cooldown();
        let duration = meeting.duration_so_far(MonotonicInstant::now());
        info!(
            meeting_id = %meeting_id,
            votes = meeting.ballot.len(),
            duration_secs = duration.as_secs(),
            "Meeting ended"
        );

        events.push(CoreEvent::ScheduleTimer {
            timer,
            after: self.config.meeting_cooldown,
        });
        events.push(CoreEvent::MeetingEnded {
            meeting_id,
            ejected: ejected.map(|(player_id, _)| player_id),
            duration,
        });
        events.extend(self.check_win());

        Ok(events)
    }

    fn check_win(&mut self) -> Option<CoreEvent> {
        if !self.started {
            return None;
        }

        let reason = evaluate(
            &self.roster,
            self.chores_completed,
            self.config.chore_win_threshold,
        )?;
        let winner = reason.winner();

        info!(winner = ?winner, reason = ?reason, "Game over");
        self.reset();

        Some(CoreEvent::GameOver { winner, reason })
    }

    fn require_living(&self, player_id: PlayerId) -> Result<()> {
        match self.roster.find(player_id) {
            Some(player) if player.is_alive => Ok(()),
            Some(_) => Err(SabotageError::PlayerNotAlive(player_id)),
            None => Err(SabotageError::PlayerNotFound(player_id)),
        }
    }

    /// Wipe the session back to an empty lobby.
    ///
    /// Meeting and cooldown counters keep counting so that timers already in
    /// flight stay stale.
    pub fn reset(&mut self) {
        self.roster = Roster::new(self.config.max_players);
        self.meetings.close();
        self.started = false;
        self.chores_completed = 0;
        self.chores_generated = 0;
        self.started_at = None;
        self.last_meeting_at = None;

        info!("Session reset");
    }

    /// Full view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            api_version: API_VERSION,
            players: self.roster.views(),
            is_game_started: self.started,
            total_tasks_completed: self.chores_completed,
            total_tasks_assigned: self.chores_generated,
            can_call_meeting: self.meetings.can_call(),
            meeting_in_progress: self.meetings.in_progress(),
            round_start_time: self.started_at,
            last_meeting_time: self.last_meeting_at,
            votes: self
                .meetings
                .active()
                .map(|m| m.ballot.votes().clone())
                .unwrap_or_default(),
        }
    }
}

/// Turn a refused request into "no events"
fn ignored(op: &'static str, result: Result<Vec<CoreEvent>>) -> Vec<CoreEvent> {
    result.unwrap_or_else(|e| {
        debug!(op, error = %e, "Request ignored");
        Vec::new()
    })
}
