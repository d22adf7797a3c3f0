//! The route guard decision.
//!
//! A pure function of the current session and the roles a route admits. It
//! performs no I/O and cannot fail.

use crate::models::RoleName;
use crate::navigation::{HOME_ROUTE, LOGIN_ROUTE};
use crate::session::Session;

/// A set of roles. The empty set admits any authenticated role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
    citizen: bool,
    service_provider: bool,
    admin: bool,
}

impl RoleSet {
    /// The empty set: any authenticated role is admitted.
    pub const fn any() -> Self {
        RoleSet {
            citizen: false,
            service_provider: false,
            admin: false,
        }
    }

    pub fn only(role: RoleName) -> Self {
        let mut set = Self::any();
        set.insert(role);
        set
    }

    pub fn insert(&mut self, role: RoleName) {
        *self.slot(role) = true;
    }

    pub fn contains(&self, role: RoleName) -> bool {
        match role {
            RoleName::Citizen => self.citizen,
            RoleName::ServiceProvider => self.service_provider,
            RoleName::Admin => self.admin,
        }
    }

    pub fn is_empty(&self) -> bool {
        !RoleName::ALL.iter().any(|role| self.contains(*role))
    }

    /// Whether a user holding `role` passes this set.
    pub fn admits(&self, role: RoleName) -> bool {
        self.is_empty() || self.contains(role)
    }

    fn slot(&mut self, role: RoleName) -> &mut bool {
        match role {
            RoleName::Citizen => &mut self.citizen,
            RoleName::ServiceProvider => &mut self.service_provider,
            RoleName::Admin => &mut self.admin,
        }
    }
}

impl FromIterator<RoleName> for RoleSet {
    fn from_iter<I: IntoIterator<Item = RoleName>>(iter: I) -> Self {
        let mut set = RoleSet::any();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// No session: send the user to the login route.
    Unauthenticated,
    /// Logged in, but the role is not admitted: send the user to the landing route.
    RoleMismatch,
    Allowed,
}

impl GuardDecision {
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            GuardDecision::Unauthenticated => Some(LOGIN_ROUTE),
            GuardDecision::RoleMismatch => Some(HOME_ROUTE),
            GuardDecision::Allowed => None,
        }
    }
}

pub fn evaluate(session: &Session, allowed: &RoleSet) -> GuardDecision {
    match session.role() {
        None => GuardDecision::Unauthenticated,
        Some(role) if allowed.admits(role) => GuardDecision::Allowed,
        Some(_) => GuardDecision::RoleMismatch,
    }
}
