//! Session tokens and the client-side auth lifecycle

pub mod backends;
pub mod claims;
pub mod navigator;
pub mod session;
pub mod token_store;
pub mod tokens;

pub use backends::{CookieAttributes, CookieStore, FileStore, MemoryStore, TokenBackend, UnavailableStore};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};
pub use session::{AuthSession, SessionPhase, SessionState};
pub use token_store::{TokenStore, decode_cookie_value};
pub use tokens::{LoginCredentials, SignupCredentials, TokenPair, UserSummary};
