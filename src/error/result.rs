//! Result type alias for vrcwatch operations.

use super::watch_error::WatchError;

/// Type alias for Results using [`WatchError`].
pub type WatchResult<T> = Result<T, WatchError>;
