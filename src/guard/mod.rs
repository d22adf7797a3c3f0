pub mod guard;
pub mod routes;

pub use guard::{evaluate, GuardDecision, RoleSet};
pub use routes::{dashboard_route, resolve, PortalRoute, RouteOutcome, View};
