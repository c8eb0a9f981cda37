//! Authentication for the upstream presence API.
//!
//! - [`store`] - the persisted session record (cookies)
//! - [`identity`] - the signed-in account and second-factor methods
//! - [`session`] - the session state machine and interactive sign-in

pub mod identity;
pub mod session;
pub mod store;

pub use identity::{Identity, TwoFactorMethod};
pub use session::{SessionManager, SessionState};
pub use store::{SessionStore, SessionTokens};
