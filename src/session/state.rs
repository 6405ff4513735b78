// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state machine.
//!
//! State only ever changes through [`SessionEvent`]s, which keeps the
//! invariant checkable in one place: `is_authenticated` holds exactly when
//! a user is present and no failure is pending.

/// The signed-in administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    pub email: Option<String>,
    /// Raw bearer credential backing this session
    pub auth_key: Option<String>,
}

/// Session state visible to the rest of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub loading: bool,
    pub user: Option<SessionUser>,
    pub error: Option<String>,
    pub is_authenticated: bool,
}

/// The four transitions.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Start,
    Success(SessionUser),
    Failure(String),
    Clear,
}

impl SessionState {
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Start => {
                self.loading = true;
                self.error = None;
            }
            SessionEvent::Success(user) => {
                self.loading = false;
                self.user = Some(user);
                self.error = None;
                self.is_authenticated = true;
            }
            SessionEvent::Failure(message) => {
                self.loading = false;
                self.user = None;
                self.error = Some(message);
                self.is_authenticated = false;
            }
            SessionEvent::Clear => {
                self.user = None;
                self.error = None;
                self.is_authenticated = false;
            }
        }
    }
}
