//! Signed-in user credentials and per-call authorisation choice.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::error::AjaxError;

/// Holds the signed-in user's bearer token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// An empty, signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session already signed in with `token`.
    #[must_use]
    pub fn signed_in(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(token);
        session
    }

    /// Replace the current token.
    pub fn sign_in(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
        info!("session signed in");
    }

    /// Forget the current token.
    pub fn sign_out(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("session signed out");
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The current token.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::MissingSession`] when signed out.
    pub fn bearer(&self) -> Result<String, AjaxError> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(AjaxError::MissingSession)
    }
}

/// How a request is authorised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    /// The signed-in user's token.
    #[default]
    Session,
    /// A specific token, such as a pet service account token.
    Bearer(String),
    /// No `Authorization` header.
    None,
}

impl Auth {
    /// Resolve to the token to send, if any.
    pub(crate) fn resolve(&self, session: &Session) -> Result<Option<String>, AjaxError> {
        match self {
            Self::Session => session.bearer().map(Some),
            Self::Bearer(token) => Ok(Some(token.clone())),
            Self::None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_session_refuses_bearer() {
        let session = Session::new();
        assert!(matches!(session.bearer(), Err(AjaxError::MissingSession)));
        session.sign_in("tok-1");
        assert_eq!(session.bearer().ok().as_deref(), Some("tok-1"));
        session.sign_out();
        assert!(!session.is_signed_in());
    }

    #[test]
    fn auth_modes_resolve_against_session() {
        let session = Session::signed_in("user-token");
        assert_eq!(
            Auth::Session.resolve(&session).ok().flatten().as_deref(),
            Some("user-token")
        );
        assert_eq!(
            Auth::Bearer("pet".into())
                .resolve(&session)
                .ok()
                .flatten()
                .as_deref(),
            Some("pet")
        );
        assert_eq!(Auth::None.resolve(&session).ok().flatten(), None);
    }
}
