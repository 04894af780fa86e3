//! Session lifecycle: persistence, auth state machine, access guards.

pub mod controller;
pub mod guard;
pub mod store;

pub use controller::{AuthPhase, RestoreTicket, SessionController};
pub use guard::{AccessGuard, Destination, GuardDecision};
pub use store::{SessionData, SessionLoad, SessionStore};
