//! Deadline timers for the control loop.
//!
//! Two timers drive everything that is not a control tick:
//!
//! ```text
//!   StatusBroadcast  periodic   full status every status_interval
//!                               (re-armed by any full broadcast)
//!   IdentityWindow   one-shot   closes the identity listening window
//! ```
//!
//! Time is a monotonic millisecond counter supplied by the caller, so the
//! scheduler is fully deterministic under test.  [`Scheduler::poll`]
//! returns the timers that came due; the caller decides what they mean.

use log::debug;

/// The timers the controller uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimerId {
    StatusBroadcast = 0,
    IdentityWindow = 1,
}

const TIMER_COUNT: usize = 2;

impl TimerId {
    const ALL: [Self; TIMER_COUNT] = [Self::StatusBroadcast, Self::IdentityWindow];

    const fn label(self) -> &'static str {
        match self {
            Self::StatusBroadcast => "status-broadcast",
            Self::IdentityWindow => "identity-window",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Periodic { interval_ms: u64 },
    OneShot,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    deadline_ms: u64,
    kind: Kind,
}

/// Fixed set of deadline timers, indexed by [`TimerId`].
#[derive(Debug, Default)]
pub struct Scheduler {
    entries: [Option<Entry>; TIMER_COUNT],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `id` to fire every `interval_ms`, first at `now + interval_ms`.
    /// Replaces any existing deadline.
    pub fn arm_periodic(&mut self, id: TimerId, interval_ms: u64, now_ms: u64) {
        debug!("Scheduler: '{}' every {}ms", id.label(), interval_ms);
        self.entries[id as usize] = Some(Entry {
            deadline_ms: now_ms.saturating_add(interval_ms),
            kind: Kind::Periodic { interval_ms },
        });
    }

    /// Arm `id` to fire once at `now + delay_ms`.
    ///
    /// An already-armed timer keeps its original deadline and `false` is
    /// returned.
    pub fn arm_once(&mut self, id: TimerId, delay_ms: u64, now_ms: u64) -> bool {
        if self.is_armed(id) {
            return false;
        }
        debug!("Scheduler: '{}' in {}ms", id.label(), delay_ms);
        self.entries[id as usize] = Some(Entry {
            deadline_ms: now_ms.saturating_add(delay_ms),
            kind: Kind::OneShot,
        });
        true
    }

    /// Push a periodic timer's next deadline out to `now + interval`.
    /// No effect on one-shot or disarmed timers.
    pub fn restart(&mut self, id: TimerId, now_ms: u64) {
        if let Some(entry) = &mut self.entries[id as usize] {
            if let Kind::Periodic { interval_ms } = entry.kind {
                entry.deadline_ms = now_ms.saturating_add(interval_ms);
            }
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.entries[id as usize].is_some()
    }

    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.entries[id as usize].map(|e| e.deadline_ms)
    }

    /// Collect every timer whose deadline has passed.  Periodic timers
    /// re-arm relative to `now`; one-shots disarm.
    pub fn poll(&mut self, now_ms: u64) -> heapless::Vec<TimerId, TIMER_COUNT> {
        let mut due = heapless::Vec::new();
        for id in TimerId::ALL {
            let slot = &mut self.entries[id as usize];
            let Some(entry) = slot else { continue };
            if now_ms < entry.deadline_ms {
                continue;
            }
            let kind = entry.kind;
            match kind {
                Kind::Periodic { interval_ms } => {
                    entry.deadline_ms = now_ms.saturating_add(interval_ms);
                }
                Kind::OneShot => *slot = None,
            }
            let _ = due.push(id);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_fires_at_interval_and_rearms() {
        let mut s = Scheduler::new();
        s.arm_periodic(TimerId::StatusBroadcast, 60_000, 0);
        assert!(s.poll(59_999).is_empty());
        assert_eq!(s.poll(60_000).as_slice(), &[TimerId::StatusBroadcast]);
        assert_eq!(s.deadline(TimerId::StatusBroadcast), Some(120_000));
        assert!(s.poll(100_000).is_empty());
    }

    #[test]
    fn restart_measures_from_last_broadcast() {
        let mut s = Scheduler::new();
        s.arm_periodic(TimerId::StatusBroadcast, 60_000, 0);
        s.restart(TimerId::StatusBroadcast, 45_000);
        assert!(s.poll(60_000).is_empty());
        assert_eq!(s.poll(105_000).as_slice(), &[TimerId::StatusBroadcast]);
    }

    #[test]
    fn oneshot_fires_once_and_keeps_first_deadline() {
        let mut s = Scheduler::new();
        assert!(s.arm_once(TimerId::IdentityWindow, 2_000, 1_000));
        assert!(!s.arm_once(TimerId::IdentityWindow, 2_000, 2_500));
        assert_eq!(s.deadline(TimerId::IdentityWindow), Some(3_000));

        assert!(s.poll(2_999).is_empty());
        assert_eq!(s.poll(3_000).as_slice(), &[TimerId::IdentityWindow]);
        assert!(!s.is_armed(TimerId::IdentityWindow));
        assert!(s.poll(10_000).is_empty());
    }

    #[test]
    fn both_due_in_one_poll() {
        let mut s = Scheduler::new();
        s.arm_periodic(TimerId::StatusBroadcast, 1_000, 0);
        s.arm_once(TimerId::IdentityWindow, 500, 0);
        let due = s.poll(5_000);
        assert_eq!(due.len(), 2);
    }
}
