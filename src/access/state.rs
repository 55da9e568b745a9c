//! Visitor-side lifecycle of a page grant.
//!
//! `Unauthenticated → RequestPending → Verifying → Granted → Expired`, with
//! `Expired` falling back to `Unauthenticated` once the stale token is gone.
//! Expiry is only noticed when the gate next runs; nothing here is timed.

use crate::access::{error::AccessError, flow::VerificationStep, gate::GateDecision};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowState {
    Unauthenticated,
    RequestPending(VerificationStep),
    Verifying(VerificationStep),
    Granted { page_route: String },
    Expired { page_route: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    RequestAccepted(VerificationStep),
    CodeSubmitted,
    CodeRejected,
    CodeAccepted,
    Gate {
        page_route: String,
        decision: GateDecision,
    },
}

impl FlowState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::RequestPending(_) => "request-pending",
            Self::Verifying(_) => "verifying",
            Self::Granted { .. } => "granted",
            Self::Expired { .. } => "expired",
        }
    }

    /// # Errors
    /// Returns [`AccessError::InvalidTransition`] when `event` cannot happen in
    /// the current state.
    pub fn transition(self, event: FlowEvent) -> Result<Self, AccessError> {
        let from = self.name();
        let next = match (self, event) {
            (Self::Unauthenticated, FlowEvent::RequestAccepted(step)) => {
                Self::RequestPending(step)
            }
            (Self::RequestPending(step), FlowEvent::CodeSubmitted) => Self::Verifying(step),
            (Self::Verifying(step), FlowEvent::CodeRejected) => Self::RequestPending(step),
            (Self::Verifying(step), FlowEvent::CodeAccepted) => Self::Granted {
                page_route: step.page_route().to_string(),
            },

            // Every navigation re-runs the gate.
            (
                Self::Granted { page_route },
                FlowEvent::Gate {
                    page_route: visited,
                    decision: GateDecision::RequireRequest,
                },
            ) if page_route == visited => Self::Expired { page_route },
            (Self::Expired { .. }, FlowEvent::Gate { decision, page_route }) => {
                Self::from_gate(page_route, decision)
            }
            (
                Self::Unauthenticated | Self::Granted { .. },
                FlowEvent::Gate { page_route, decision },
            ) => Self::from_gate(page_route, decision),
            // Browsing while a request is open keeps the step unless the page
            // opens anyway, e.g. for an administrator.
            (
                Self::RequestPending(_) | Self::Verifying(_),
                FlowEvent::Gate {
                    page_route,
                    decision: GateDecision::Allow,
                },
            ) => Self::Granted { page_route },
            (
                state @ (Self::RequestPending(_) | Self::Verifying(_)),
                FlowEvent::Gate {
                    decision: GateDecision::RequireRequest,
                    ..
                },
            ) => state,

            (_, event) => {
                return Err(AccessError::InvalidTransition {
                    from,
                    event: event.name(),
                });
            }
        };

        Ok(next)
    }

    fn from_gate(page_route: String, decision: GateDecision) -> Self {
        match decision {
            GateDecision::Allow => Self::Granted { page_route },
            GateDecision::RequireRequest => Self::Unauthenticated,
        }
    }
}

impl FlowEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestAccepted(_) => "request-accepted",
            Self::CodeSubmitted => "code-submitted",
            Self::CodeRejected => "code-rejected",
            Self::CodeAccepted => "code-accepted",
            Self::Gate { .. } => "gate",
        }
    }
}
