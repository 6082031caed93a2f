// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The session capability consumed by the auth gate.
//!
//! The token is owned by the session; the transport only reads it per request and asks the
//! session to tear itself down when the server rejects the credentials.

use std::sync::RwLock;

use tracing::warn;

pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

pub trait TokenSource: Send + Sync {
    /// The bearer token to attach, if the user is logged in.
    fn token(&self) -> Option<String>;

    /// Called once per rejected request: clear the session and navigate to the login page.
    fn on_unauthorized(&self);
}

/// The token of `source` as stored, unless missing or blank.
pub(crate) fn usable_token(source: &dyn TokenSource) -> Option<String> {
    source.token().filter(|token| !token.trim().is_empty())
}

/// Anonymous access: never a token, nothing to tear down.
pub struct NoSession;

impl TokenSource for NoSession {
    fn token(&self) -> Option<String> {
        None
    }

    fn on_unauthorized(&self) {}
}

type Navigator = Box<dyn Fn(&str) + Send + Sync>;

/// A process-local session holding the current token.
pub struct InMemorySession {
    token: RwLock<Option<String>>,
    login_route: String,
    navigator: Option<Navigator>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            navigator: None,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    pub fn with_login_route(mut self, login_route: impl Into<String>) -> Self {
        self.login_route = login_route.into();
        self
    }

    /// Hook invoked with the login route after the session has been torn down.
    pub fn with_navigator(mut self, navigator: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.navigator = Some(Box::new(navigator));
        self
    }

    pub fn login(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn logout(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_authenticated(&self) -> bool {
        usable_token(self).is_some()
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for InMemorySession {
    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn on_unauthorized(&self) {
        warn!(
            login_route = %self.login_route,
            "Session rejected by the server, logging out"
        );
        self.logout();

        if let Some(navigator) = &self.navigator {
            navigator(&self.login_route);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn blank_tokens_are_unusable() {
        let session = InMemorySession::with_token("   ");
        assert_eq!(usable_token(&session), None);

        session.login("abc");
        assert_eq!(usable_token(&session), Some("abc".to_string()));

        // Only blankness is checked; the stored value is used verbatim
        session.login(" abc ");
        assert_eq!(usable_token(&session), Some(" abc ".to_string()));
        assert_eq!(usable_token(&NoSession), None);
    }

    #[test]
    fn teardown_clears_token_and_navigates() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let session = {
            let visited = visited.clone();
            InMemorySession::with_token("abc")
                .with_login_route("/auth/login")
                .with_navigator(move |route| visited.lock().unwrap().push(route.to_string()))
        };

        session.on_unauthorized();

        assert_eq!(session.token(), None);
        assert_eq!(*visited.lock().unwrap(), vec!["/auth/login".to_string()]);
    }
}
