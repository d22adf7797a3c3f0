//! The portal's route table and what each route renders for a given session.

use super::guard::{evaluate, GuardDecision, RoleSet};
use crate::models::RoleName;
use crate::navigation::HOME_ROUTE;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalRoute {
    Login,
    Home,
    /// `/citizen` and everything below it.
    Citizen,
    /// `/provider` and everything below it.
    Provider,
    /// `/admin` and everything below it.
    Admin,
}

impl PortalRoute {
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let under = |prefix: &str| {
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        };

        if path == "/" {
            Some(PortalRoute::Home)
        } else if path == "/login" {
            Some(PortalRoute::Login)
        } else if under("/citizen") {
            Some(PortalRoute::Citizen)
        } else if under("/provider") {
            Some(PortalRoute::Provider)
        } else if under("/admin") {
            Some(PortalRoute::Admin)
        } else {
            None
        }
    }

    /// Roles a guarded route admits; `None` for the public login route.
    pub fn allowed_roles(&self) -> Option<RoleSet> {
        match self {
            PortalRoute::Login => None,
            PortalRoute::Home => Some(RoleSet::any()),
            PortalRoute::Citizen => Some(RoleSet::only(RoleName::Citizen)),
            PortalRoute::Provider => Some(RoleSet::only(RoleName::ServiceProvider)),
            PortalRoute::Admin => Some(RoleSet::only(RoleName::Admin)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    CitizenDashboard,
    ProviderDashboard,
    AdminDashboard,
}

impl View {
    pub fn dashboard_for(role: RoleName) -> Self {
        match role {
            RoleName::Citizen => View::CitizenDashboard,
            RoleName::ServiceProvider => View::ProviderDashboard,
            RoleName::Admin => View::AdminDashboard,
        }
    }
}

/// Where a freshly logged in user of `role` lands.
pub fn dashboard_route(role: RoleName) -> &'static str {
    match role {
        RoleName::Citizen => "/citizen",
        RoleName::ServiceProvider => "/provider",
        RoleName::Admin => "/admin",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Render(View),
    Redirect(&'static str),
    NotFound,
}

/// Decides what navigating to `path` shows with the given session.
pub fn resolve(session: &Session, path: &str) -> RouteOutcome {
    let Some(route) = PortalRoute::from_path(path) else {
        return RouteOutcome::NotFound;
    };

    let Some(allowed) = route.allowed_roles() else {
        // Only the login route is public; an authenticated user has no business there.
        return if session.is_authenticated() {
            RouteOutcome::Redirect(HOME_ROUTE)
        } else {
            RouteOutcome::Render(View::Login)
        };
    };

    match evaluate(session, &allowed) {
        GuardDecision::Allowed => match session.role() {
            Some(role) => RouteOutcome::Render(View::dashboard_for(role)),
            None => RouteOutcome::NotFound,
        },
        denied => match denied.redirect() {
            Some(target) => RouteOutcome::Redirect(target),
            None => RouteOutcome::NotFound,
        },
    }
}
