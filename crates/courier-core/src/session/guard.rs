//! Access guards.
//!
//! Two configurations of one decision capability: protected surfaces render
//! only for an authenticated session, public-only surfaces (login,
//! registration) bounce an already-authenticated session to the dashboard.

use super::controller::AuthPhase;

/// Where a rejected navigation should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Public entry: the login surface.
    Login,
    /// Protected entry: the signed-in dashboard.
    Dashboard,
}

/// Outcome of consulting a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the guarded surface.
    Render,
    /// Auth state is still being resolved; hold without redirecting.
    Wait,
    /// Send the caller elsewhere.
    Redirect(Destination),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardKind {
    Protected,
    PublicOnly,
}

/// Gate over the auth phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGuard {
    kind: GuardKind,
}

impl AccessGuard {
    /// Guard for surfaces that require a session.
    pub fn protected() -> Self {
        Self {
            kind: GuardKind::Protected,
        }
    }

    /// Guard for surfaces only meaningful without a session.
    pub fn public_only() -> Self {
        Self {
            kind: GuardKind::PublicOnly,
        }
    }

    /// Decides render-vs-redirect for the current phase.
    ///
    /// Guards hold no state of their own; callers re-consult after any
    /// asynchronous phase change.
    pub fn decide(&self, phase: &AuthPhase) -> GuardDecision {
        match self.kind {
            GuardKind::Protected => match phase {
                AuthPhase::Loading => GuardDecision::Wait,
                AuthPhase::Unauthenticated => GuardDecision::Redirect(Destination::Login),
                AuthPhase::Authenticated { .. } => GuardDecision::Render,
            },
            // Public-only renders while loading: never redirect prematurely.
            GuardKind::PublicOnly => match phase {
                AuthPhase::Authenticated { .. } => GuardDecision::Redirect(Destination::Dashboard),
                AuthPhase::Loading | AuthPhase::Unauthenticated => GuardDecision::Render,
            },
        }
    }
}
