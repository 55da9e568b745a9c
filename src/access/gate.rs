//! Per-navigation access decision for protected pages.
//!
//! A page is shown if and only if the session role is `ADMIN`, or the stored
//! temporary token decodes, names exactly this page and has not expired.
//! Anything else shows the request flow. Invalid temporary tokens are removed
//! as they are found; that cleanup is the only side effect and repeating it is
//! harmless.

use crate::access::{
    claims::{SessionClaims, TemporaryAccessClaims, decode_claims},
    store::{SESSION_TOKEN_KEY, TEMP_ACCESS_TOKEN_KEY, TokenStore},
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Derived on every evaluation and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RequireRequest,
}

impl GateDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

// Diagnostic only; callers see a plain `GateDecision`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reason {
    Admin,
    ScopedGrant,
    NoGrant,
    Undecodable,
    ScopeMismatch,
    Expired,
}

/// Outcome of guarding a page: the rendered page, or the request flow for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Guarded<T> {
    Page(T),
    RequestAccess { page_route: String },
}

pub struct AccessGate<S> {
    store: S,
}

impl<S: TokenStore> AccessGate<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate against the system clock.
    pub fn evaluate(&self, page_route: &str) -> GateDecision {
        self.evaluate_at(page_route, now_millis())
    }

    pub fn evaluate_at(&self, page_route: &str, now_ms: i64) -> GateDecision {
        let reason = self.reason_at(page_route, now_ms);
        debug!(page_route, ?reason, "gate evaluated");

        match reason {
            Reason::Admin | Reason::ScopedGrant => GateDecision::Allow,
            Reason::NoGrant | Reason::Undecodable | Reason::ScopeMismatch | Reason::Expired => {
                GateDecision::RequireRequest
            }
        }
    }

    /// Run `render` only when the page is allowed.
    pub fn guard<T>(&self, page_route: &str, render: impl FnOnce() -> T) -> Guarded<T> {
        match self.evaluate(page_route) {
            GateDecision::Allow => Guarded::Page(render()),
            GateDecision::RequireRequest => Guarded::RequestAccess {
                page_route: page_route.to_string(),
            },
        }
    }

    fn reason_at(&self, page_route: &str, now_ms: i64) -> Reason {
        if self.session_is_admin() {
            return Reason::Admin;
        }

        let token = match self.store.get(TEMP_ACCESS_TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => return Reason::NoGrant,
            Err(err) => {
                warn!("failed to read temporary access slot: {}", err);
                return Reason::NoGrant;
            }
        };

        let reason = match decode_claims::<TemporaryAccessClaims>(&token) {
            Err(_) => Reason::Undecodable,
            Ok(claims) if claims.page_route != page_route => Reason::ScopeMismatch,
            Ok(claims) if claims.is_expired(now_ms) => Reason::Expired,
            Ok(_) => return Reason::ScopedGrant,
        };

        self.discard_grant();
        reason
    }

    fn session_is_admin(&self) -> bool {
        match self.store.get(SESSION_TOKEN_KEY) {
            Ok(Some(token)) => decode_claims::<SessionClaims>(&token)
                .map(|claims| claims.is_admin())
                .unwrap_or(false),
            Ok(None) => false,
            Err(err) => {
                warn!("failed to read session slot: {}", err);
                false
            }
        }
    }

    fn discard_grant(&self) {
        if let Err(err) = self.store.remove(TEMP_ACCESS_TOKEN_KEY) {
            warn!("failed to clear temporary access slot: {}", err);
        }
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
