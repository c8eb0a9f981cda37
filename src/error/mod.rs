//! Error handling for vrcwatch.
//!
//! | Failure | Where it ends up |
//! |---------|------------------|
//! | Bad credentials / code | [`AuthError`], returned to the caller |
//! | Stale session | a `bool`, triggers re-authentication |
//! | Polling failure | retried, then a stale or placeholder snapshot |
//! | Place-name lookup | the raw world id |
//! | Sink delivery | logged and dropped |
//! | Bad configuration | [`ConfigError`] |

mod auth;
mod config;
mod result;
mod watch_error;

pub use auth::AuthError;
pub use config::ConfigError;
pub use result::WatchResult;
pub use watch_error::WatchError;
