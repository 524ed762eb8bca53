//! Typed accessors over the per-visitor session.
//!
//! The session carries three things: the identity backend token
//! (presence implies "authenticated this session"), a cached snapshot
//! of the account, and the flash error bag that survives exactly one
//! redirect.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use common::UserProfile;

/// Session key for the identity backend token.
pub const TOKEN_KEY: &str = "token";
/// Session key for the cached account snapshot.
pub const USER_KEY: &str = "user";
/// Session key for the flash error bag.
pub const ERRORS_KEY: &str = "errors";

/// Per-slot flash messages. Each slot belongs to one flow; the
/// error-context middleware copies the whole bag into the render
/// context and resets it at the start of every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBag {
    #[serde(default)]
    pub general: Vec<String>,
    #[serde(default)]
    pub login: Vec<String>,
    #[serde(default)]
    pub register: Vec<String>,
    #[serde(default)]
    pub profile: Vec<String>,
    #[serde(default)]
    pub password: Vec<String>,
}

/// Names one flash slot in an [`ErrorBag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSlot {
    General,
    Login,
    Register,
    Profile,
    Password,
}

impl ErrorBag {
    pub fn slot_mut(&mut self, slot: ErrorSlot) -> &mut Vec<String> {
        match slot {
            ErrorSlot::General => &mut self.general,
            ErrorSlot::Login => &mut self.login,
            ErrorSlot::Register => &mut self.register,
            ErrorSlot::Profile => &mut self.profile,
            ErrorSlot::Password => &mut self.password,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_empty()
            && self.login.is_empty()
            && self.register.is_empty()
            && self.profile.is_empty()
            && self.password.is_empty()
    }
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

pub async fn token(session: &Session) -> SessionResult<Option<String>> {
    session.get::<String>(TOKEN_KEY).await
}

/// Marks the session authenticated: stores the backend token and the
/// account snapshot it belongs to.
pub async fn authenticate(
    session: &Session,
    token: String,
    user: UserProfile,
) -> SessionResult<()> {
    session.insert(TOKEN_KEY, token).await?;
    session.insert(USER_KEY, user).await
}

pub async fn cache_user(session: &Session, user: &UserProfile) -> SessionResult<()> {
    session.insert(USER_KEY, user).await
}

pub async fn errors(session: &Session) -> SessionResult<Option<ErrorBag>> {
    session.get::<ErrorBag>(ERRORS_KEY).await
}

pub async fn set_errors(session: &Session, errors: &ErrorBag) -> SessionResult<()> {
    session.insert(ERRORS_KEY, errors).await
}

/// Appends messages to one flash slot so they surface on the next
/// request's render.
pub async fn flash(
    session: &Session,
    slot: ErrorSlot,
    messages: Vec<String>,
) -> SessionResult<()> {
    let mut bag = errors(session).await?.unwrap_or_default();
    bag.slot_mut(slot).extend(messages);
    set_errors(session, &bag).await
}

/// Destroys the session: the store record is deleted and the visitor
/// is anonymous again.
pub async fn destroy(session: &Session) -> SessionResult<()> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bag_is_empty() {
        assert!(ErrorBag::default().is_empty());
    }

    #[test]
    fn slot_mut_targets_the_named_slot() {
        let mut bag = ErrorBag::default();
        bag.slot_mut(ErrorSlot::Login).push("nope".to_string());
        assert_eq!(bag.login, vec!["nope".to_string()]);
        assert!(bag.general.is_empty());
        assert!(!bag.is_empty());
    }
}
