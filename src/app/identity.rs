//! Instance index negotiation.
//!
//! Controllers sharing a namespace give themselves distinct small integer
//! indices without a coordinator: listen on `<ns>/online` for a fixed
//! window, then claim one more than the highest index heard.
//!
//! ```text
//!                 on_connected
//!  Unresolved ──────────────────▶ window open ── observe(peer) ─┐
//!  {observed_max}                     │   ▲                     │
//!                                     │   └─────────────────────┘
//!                                close_window
//!                                     ▼
//!  Resolved{index} ── on_connected ──▶ announce index (no window)
//! ```
//!
//! A resolved index is never recomputed.  Two fresh controllers whose
//! windows overlap can still claim the same index; that race is accepted
//! at provisioning time.

use log::{debug, info};

/// Where the negotiation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiatorState {
    Unresolved { observed_max: i32 },
    Resolved { index: u16 },
}

/// What the caller should do after a connection comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectAction {
    /// Identity already known: broadcast it now.
    Announce(u16),
    /// Start the listening window timer.
    OpenWindow,
    /// A window from an earlier connection is still running.
    WindowAlreadyOpen,
}

/// How an inbound identity broadcast was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Our own retained broadcast coming back.
    SelfEcho,
    /// Counted toward the claim.
    Recorded,
    /// A peer's index, heard after we resolved.  No effect.
    Peer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexNegotiator {
    state: NegotiatorState,
    window_open: bool,
}

impl IndexNegotiator {
    /// Start from the persisted index, if any.
    pub fn new(persisted: Option<u16>) -> Self {
        let state = match persisted {
            Some(index) => NegotiatorState::Resolved { index },
            None => NegotiatorState::Unresolved { observed_max: -1 },
        };
        Self {
            state,
            window_open: false,
        }
    }

    pub fn state(&self) -> NegotiatorState {
        self.state
    }

    pub fn index(&self) -> Option<u16> {
        match self.state {
            NegotiatorState::Resolved { index } => Some(index),
            NegotiatorState::Unresolved { .. } => None,
        }
    }

    pub fn window_open(&self) -> bool {
        self.window_open
    }

    pub fn on_connected(&mut self) -> ConnectAction {
        match self.state {
            NegotiatorState::Resolved { index } => ConnectAction::Announce(index),
            NegotiatorState::Unresolved { .. } if self.window_open => ConnectAction::WindowAlreadyOpen,
            NegotiatorState::Unresolved { .. } => {
                self.window_open = true;
                debug!("identity: listening for peers");
                ConnectAction::OpenWindow
            }
        }
    }

    /// Take one `<ns>/online` payload.
    ///
    /// Broadcasts heard before the window opens still count: a retained
    /// peer index delivered right after subscribing is exactly what the
    /// window is for.
    pub fn observe(&mut self, peer: i32) -> Observation {
        match &mut self.state {
            NegotiatorState::Resolved { index } if i32::from(*index) == peer => Observation::SelfEcho,
            NegotiatorState::Resolved { .. } => Observation::Peer,
            NegotiatorState::Unresolved { observed_max } => {
                if peer > *observed_max {
                    *observed_max = peer;
                }
                Observation::Recorded
            }
        }
    }

    /// Close the window and claim.  `Some(index)` only when this call made
    /// the claim.
    pub fn close_window(&mut self) -> Option<u16> {
        self.window_open = false;
        let NegotiatorState::Unresolved { observed_max } = self.state else {
            return None;
        };
        let claimed = observed_max.saturating_add(1).clamp(0, i32::from(u16::MAX)) as u16;
        self.state = NegotiatorState::Resolved { index: claimed };
        info!("identity: claimed index {} (highest peer {})", claimed, observed_max);
        Some(claimed)
    }
}
