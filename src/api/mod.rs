//! Edge server: route guard, short-code probe and site pages

pub mod guard;
pub mod middleware;
pub mod probe;
pub mod services;

pub use guard::{RouteDecision, RoutePolicy, has_valid_session};
pub use probe::{BackendProbe, ShortCodeProbe};
