use crate::models::{RoleName, User};

/// The client-held pair of bearer token and user profile.
///
/// Either half may be absent; only a session holding both counts as authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        Session {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!((&self.token, &self.user), (Some(token), Some(_)) if !token.is_empty())
    }

    /// The user's role, only for an authenticated session.
    pub fn role(&self) -> Option<RoleName> {
        if !self.is_authenticated() {
            return None;
        }
        self.user.as_ref().map(User::role_name)
    }
}
