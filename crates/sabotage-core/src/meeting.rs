//! Meeting lifecycle: call, vote, resolve

use chrono::{DateTime, Local};
use sabotage_util::{CooldownToken, MeetingId, MonotonicInstant, PlayerId, Result, SabotageError};
use std::collections::BTreeMap;
use std::time::Duration;

/// A deferred action the engine asks the service to deliver back later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// The cooldown identified by `token` is over; meetings may be called
    CooldownElapsed { token: CooldownToken },

    /// Voting time for `meeting_id` ran out
    VoteDeadline { meeting_id: MeetingId },
}

/// Votes of the current meeting, voter -> target
///
/// Keyed by voter, so each voter appears at most once. Recasting replaces
/// the earlier choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballot {
    votes: BTreeMap<PlayerId, PlayerId>,
}

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote, returning the target it replaced
    pub fn cast(&mut self, voter: PlayerId, target: PlayerId) -> Option<PlayerId> {
        self.votes.insert(voter, target)
    }

    pub fn remove(&mut self, voter: PlayerId) -> Option<PlayerId> {
        self.votes.remove(&voter)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn votes(&self) -> &BTreeMap<PlayerId, PlayerId> {
        &self.votes
    }

    /// The target with the most votes.
    ///
    /// Targets are tallied in ascending id order and only a strictly greater
    /// count displaces the current leader, so a tie goes to the lowest id.
    /// An empty ballot has no leader.
    pub fn leader(&self) -> Option<PlayerId> {
        let mut tally: BTreeMap<PlayerId, usize> = BTreeMap::new();
        for target in self.votes.values() {
            *tally.entry(*target).or_default() += 1;
        }

        let mut best: Option<(PlayerId, usize)> = None;
        for (target, count) in tally {
            if best.is_none_or(|(_, leading)| count > leading) {
                best = Some((target, count));
            }
        }

        best.map(|(target, _)| target)
    }
}

/// A meeting that is accepting votes
#[derive(Debug, Clone)]
pub struct ActiveMeeting {
    pub meeting_id: MeetingId,
    pub called_by: PlayerId,
    pub called_at: DateTime<Local>,
    pub called_at_mono: MonotonicInstant,
    pub ballot: Ballot,
}

impl ActiveMeeting {
    /// How long voting has been open
    pub fn duration_so_far(&self, now_mono: MonotonicInstant) -> Duration {
        now_mono.duration_since(self.called_at_mono)
    }
}

/// Where the meeting subsystem currently is
#[derive(Debug, Clone, Default)]
pub enum MeetingPhase {
    /// No game running
    #[default]
    Closed,

    /// Waiting for the matching [`Timer::CooldownElapsed`]
    Cooldown { token: CooldownToken },

    /// Anyone alive may call a meeting
    Open,

    /// Voting
    InProgress(ActiveMeeting),
}

/// Meeting state machine
///
/// The id and token counters keep counting across game resets, so a timer
/// scheduled in one game can never match state from a later one.
#[derive(Debug, Default)]
pub struct Meetings {
    phase: MeetingPhase,
    last_meeting_id: u64,
    last_token: u64,
}

impl Meetings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &MeetingPhase {
        &self.phase
    }

    /// Whether a meeting may be called right now
    pub fn can_call(&self) -> bool {
        matches!(self.phase, MeetingPhase::Open)
    }

    pub fn in_progress(&self) -> bool {
        matches!(self.phase, MeetingPhase::InProgress(_))
    }

    pub fn active(&self) -> Option<&ActiveMeeting> {
        match &self.phase {
            MeetingPhase::InProgress(meeting) => Some(meeting),
            _ => None,
        }
    }

    /// Enter a fresh cooldown. The returned timer reopens meetings.
    pub fn begin_cooldown(&mut self) -> Timer {
        self.last_token += 1;
        let token = CooldownToken::new(self.last_token);
        self.phase = MeetingPhase::Cooldown { token };
        Timer::CooldownElapsed { token }
    }

    /// Open meetings if `token` names the current cooldown
    pub fn end_cooldown(&mut self, token: CooldownToken) -> Result<()> {
        match self.phase {
            MeetingPhase::Cooldown { token: current } if current == token => {
                self.phase = MeetingPhase::Open;
                Ok(())
            }
            _ => Err(SabotageError::StaleCooldownTimer),
        }
    }

    /// Start a meeting on behalf of `caller`, with an empty ballot
    pub fn call(
        &mut self,
        caller: PlayerId,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> Result<MeetingId> {
        if !self.can_call() {
            return Err(SabotageError::MeetingNotOpen);
        }

        self.last_meeting_id += 1;
        let meeting_id = MeetingId::new(self.last_meeting_id);
        self.phase = MeetingPhase::InProgress(ActiveMeeting {
            meeting_id,
            called_by: caller,
            called_at: now,
            called_at_mono: now_mono,
            ballot: Ballot::new(),
        });

        Ok(meeting_id)
    }

    /// Record a vote in the running meeting. Returns the ballot size.
    pub fn vote(&mut self, voter: PlayerId, target: PlayerId) -> Result<usize> {
        match &mut self.phase {
            MeetingPhase::InProgress(meeting) => {
                meeting.ballot.cast(voter, target);
                Ok(meeting.ballot.len())
            }
            _ => Err(SabotageError::NoMeetingInProgress),
        }
    }

    /// Drop whatever `voter` cast in the running meeting
    pub fn forget_voter(&mut self, voter: PlayerId) {
        if let MeetingPhase::InProgress(meeting) = &mut self.phase {
            meeting.ballot.remove(voter);
        }
    }

    /// End the running meeting if it is `meeting_id`.
    ///
    /// The phase drops to `Closed`; the caller decides what comes next.
    pub fn finish(&mut self, meeting_id: MeetingId) -> Result<ActiveMeeting> {
        match std::mem::take(&mut self.phase) {
            MeetingPhase::InProgress(meeting) if meeting.meeting_id == meeting_id => Ok(meeting),
            MeetingPhase::InProgress(meeting) => {
                self.phase = MeetingPhase::InProgress(meeting);
                Err(SabotageError::StaleMeetingTimer(meeting_id))
            }
            other => {
                self.phase = other;
                Err(SabotageError::StaleMeetingTimer(meeting_id))
            }
        }
    }

    /// Back to `Closed`, keeping the counters
    pub fn close(&mut self) {
        self.phase = MeetingPhase::Closed;
    }
}
