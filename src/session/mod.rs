// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session guard: credential lifecycle, session state and route gating.

pub mod credential;
pub mod guard;
pub mod state;
pub mod store;

pub use credential::Credential;
pub use guard::{Route, SessionGuard};
pub use state::{SessionEvent, SessionState, SessionUser};
pub use store::CredentialStore;
