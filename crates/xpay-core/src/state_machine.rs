use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Settlement lifecycle of a channel's claim slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimState {
    /// No claim queued for the channel.
    Idle,
    /// A verified claim is waiting for settlement.
    Queued,
    /// The settlement transaction is with the ledger client.
    Submitting,
    /// Receipt recorded, queue entry cleared. Final for the settled claim.
    Settled,
    /// Submission failed; the claim is still queued and may be retried.
    SubmitFailed,
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Queued => write!(f, "Queued"),
            Self::Submitting => write!(f, "Submitting"),
            Self::Settled => write!(f, "Settled"),
            Self::SubmitFailed => write!(f, "SubmitFailed"),
        }
    }
}

/// Events that drive a claim slot between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimEvent {
    /// A higher claim was admitted (new or replacing the queued one).
    Admitted,
    /// The settlement descriptor was dispatched.
    SubmissionStarted,
    /// The ledger reported success.
    SubmissionConfirmed,
    /// The ledger client failed or reported a non-success outcome.
    SubmissionFailed,
    /// The caller re-arms a failed claim for another attempt.
    Retry,
}

/// Valid transitions:
/// - Idle → Queued (Admitted)
/// - Queued → Queued (Admitted, replaces the queued claim)
/// - Queued → Submitting (SubmissionStarted)
/// - Submitting → Submitting (Admitted, newer claim waits behind the in-flight one)
/// - Submitting → Settled (SubmissionConfirmed)
/// - Submitting → SubmitFailed (SubmissionFailed)
/// - SubmitFailed → Queued (Retry | Admitted)
/// - Settled → Queued (Admitted, next claim on the channel)
pub struct ClaimStateMachine;

impl ClaimStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(current: ClaimState, event: ClaimEvent) -> Result<ClaimState, CoreError> {
        let new_state = match (current, event) {
            (ClaimState::Idle, ClaimEvent::Admitted) => ClaimState::Queued,
            (ClaimState::Queued, ClaimEvent::Admitted) => ClaimState::Queued,
            (ClaimState::Queued, ClaimEvent::SubmissionStarted) => ClaimState::Submitting,

            (ClaimState::Submitting, ClaimEvent::Admitted) => ClaimState::Submitting,
            (ClaimState::Submitting, ClaimEvent::SubmissionConfirmed) => ClaimState::Settled,
            (ClaimState::Submitting, ClaimEvent::SubmissionFailed) => ClaimState::SubmitFailed,

            (ClaimState::SubmitFailed, ClaimEvent::Retry) => ClaimState::Queued,
            (ClaimState::SubmitFailed, ClaimEvent::Admitted) => ClaimState::Queued,

            (ClaimState::Settled, ClaimEvent::Admitted) => ClaimState::Queued,

            _ => {
                let target = match event {
                    ClaimEvent::Admitted | ClaimEvent::Retry => ClaimState::Queued,
                    ClaimEvent::SubmissionStarted => ClaimState::Submitting,
                    ClaimEvent::SubmissionConfirmed => ClaimState::Settled,
                    ClaimEvent::SubmissionFailed => ClaimState::SubmitFailed,
                };
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "claim state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: ClaimState, event: ClaimEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
