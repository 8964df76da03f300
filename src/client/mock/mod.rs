//! In-memory backend for offline use and tests

mod backend;
pub mod data;
mod jwt;

pub use backend::MockBackend;
pub use jwt::{MockClaims, MockJwt};
