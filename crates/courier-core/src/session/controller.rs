//! Session lifecycle state machine.
//!
//! The controller is the single source of truth for the auth phase and owns
//! the optimistic-restore-then-revalidate startup sequence: a stored session
//! is trusted immediately, then confirmed against the gateway in the
//! background. Every `login`/`logout` bumps an epoch; a revalidation
//! completion whose epoch no longer matches is stale and is discarded, so a
//! late callback can never resurrect or re-clear a session it did not start
//! from.

use anyhow::Result;

use crate::api::ApiClient;
use crate::api::types::User;
use super::store::{SessionData, SessionLoad, SessionStore};

/// Derived authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    /// Startup revalidation has not finished yet.
    Loading,
    Unauthenticated,
    /// Token and profile are always present together.
    Authenticated { token: String, profile: User },
}

impl AuthPhase {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthPhase::Authenticated { .. })
    }
}

/// Handle for one startup revalidation, tagged with the epoch it started in.
#[derive(Debug)]
pub struct RestoreTicket {
    epoch: u64,
    token: String,
}

impl RestoreTicket {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Owns the auth phase, the persistent store, and the startup protocol.
#[derive(Debug)]
pub struct SessionController {
    store: SessionStore,
    phase: AuthPhase,
    epoch: u64,
    startup_done: bool,
}

impl SessionController {
    /// Creates a controller in the `Loading` phase.
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            phase: AuthPhase::Loading,
            epoch: 0,
            startup_done: false,
        }
    }

    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase.is_authenticated()
    }

    /// True until the startup sequence has completed, whatever its outcome.
    pub fn is_loading(&self) -> bool {
        !self.startup_done
    }

    pub fn token(&self) -> Option<&str> {
        match &self.phase {
            AuthPhase::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&User> {
        match &self.phase {
            AuthPhase::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// First half of startup: optimistic restore from the store.
    ///
    /// Returns a ticket when a stored session was restored and now needs
    /// revalidation. With no ticket the startup sequence is already complete:
    /// an empty store goes straight to `Unauthenticated` without any gateway
    /// call, and a corrupt store is cleared first.
    pub fn begin_restore(&mut self) -> Option<RestoreTicket> {
        match self.store.load() {
            SessionLoad::Present(SessionData { token, profile }) => {
                tracing::debug!(user = %profile.email, "restored session, revalidating");
                self.phase = AuthPhase::Authenticated {
                    token: token.clone(),
                    profile,
                };
                Some(RestoreTicket {
                    epoch: self.epoch,
                    token,
                })
            }
            SessionLoad::Empty => {
                tracing::debug!("no stored session");
                self.phase = AuthPhase::Unauthenticated;
                self.startup_done = true;
                None
            }
            SessionLoad::Corrupt => {
                tracing::debug!("corrupt stored session, clearing");
                if let Err(err) = self.store.clear() {
                    tracing::debug!("failed to clear corrupt session: {err:#}");
                }
                self.phase = AuthPhase::Unauthenticated;
                self.startup_done = true;
                None
            }
        }
    }

    /// Second half of startup: applies the revalidation outcome.
    ///
    /// The loading flag flips exactly once here, stale or not. A stale ticket
    /// (an intervening `login`/`logout` bumped the epoch) otherwise changes
    /// nothing: success must not resurrect a logged-out session, and failure
    /// must not clear a session established after the restore.
    pub fn complete_restore(&mut self, ticket: RestoreTicket, result: Result<User>) {
        self.startup_done = true;

        if ticket.epoch != self.epoch {
            tracing::debug!("discarding stale revalidation result");
            return;
        }

        match result {
            Ok(profile) => {
                // Confirmation, not a write: adopt the fresh profile in
                // memory, leave the store untouched.
                if let AuthPhase::Authenticated { token, .. } = &self.phase {
                    self.phase = AuthPhase::Authenticated {
                        token: token.clone(),
                        profile,
                    };
                }
            }
            Err(err) => {
                tracing::debug!("session revalidation failed: {err:#}");
                if let Err(err) = self.store.clear() {
                    tracing::debug!("failed to clear rejected session: {err:#}");
                }
                self.phase = AuthPhase::Unauthenticated;
            }
        }
    }

    /// Runs the full startup sequence against the gateway.
    ///
    /// Never fails: every error path resolves into a definite
    /// `Unauthenticated` phase with the loading flag off.
    pub async fn initialize(&mut self, api: &ApiClient) {
        let Some(ticket) = self.begin_restore() else {
            return;
        };

        let result = api
            .with_bearer(ticket.token())
            .get_profile()
            .await
            .map(|resp| resp.user);
        self.complete_restore(ticket, result);
    }

    /// Establishes a session: persists the pair, then updates memory.
    ///
    /// Idempotent; last write wins. A store fault is logged and does not
    /// block the in-memory transition.
    pub fn login(&mut self, token: String, profile: User) {
        if let Err(err) = self.store.save(&SessionData {
            token: token.clone(),
            profile: profile.clone(),
        }) {
            tracing::warn!("failed to persist session: {err:#}");
        }
        tracing::debug!(user = %profile.email, "signed in");
        self.phase = AuthPhase::Authenticated { token, profile };
        self.epoch += 1;
    }

    /// Ends the session locally. No gateway call; always succeeds.
    ///
    /// Returns whether a session existed (stored or in memory).
    pub fn logout(&mut self) -> bool {
        let had_session = self.store.has_session() || self.phase.is_authenticated();
        if let Err(err) = self.store.clear() {
            tracing::warn!("failed to clear stored session: {err:#}");
        }
        tracing::debug!("signed out");
        self.phase = AuthPhase::Unauthenticated;
        self.epoch += 1;
        had_session
    }
}
