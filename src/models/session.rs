//! The single-session record.

use serde::{Deserialize, Serialize};

/// Storage key of the session document.
pub const SESSION_KEY: &str = "session";

/// Logged-in user marker. Has no expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Current user, `None` when logged out
    pub user_id: Option<i64>,
}
