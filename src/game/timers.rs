//! One-shot timed effects keyed by cancellation tokens
//!
//! Deadlines are measured on the session's simulation clock, which only
//! advances while the level is being played. Pausing therefore freezes
//! every pending effect, and starting a level cancels them wholesale.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Handle to a pending timer, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(u64);

/// What happens when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// The post-hit invulnerability window closes
    InvulnerabilityEnds,
    /// The revealed path overlay is cleared
    RevealExpires,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scheduled {
    token: TimerToken,
    kind: TimerKind,
    due_at: f32,
}

/// Pending timers for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    next_token: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` to fire once the clock reaches `due_at`.
    pub fn schedule(&mut self, kind: TimerKind, due_at: f32) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Scheduled { token, kind, due_at });
        token
    }

    /// Cancels a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.token != token);
        self.pending.len() != before
    }

    /// Drops every pending timer.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.iter().any(|s| s.token == token)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns every timer due at `now`, earliest first.
    pub fn fire_due(&mut self, now: f32) -> SmallVec<[(TimerToken, TimerKind); 2]> {
        let mut fired: SmallVec<[Scheduled; 2]> = SmallVec::new();
        self.pending.retain(|s| {
            if s.due_at <= now {
                fired.push(s.clone());
                false
            } else {
                true
            }
        });
        fired.sort_by(|a, b| a.due_at.total_cmp(&b.due_at));
        fired.into_iter().map(|s| (s.token, s.kind)).collect()
    }
}
