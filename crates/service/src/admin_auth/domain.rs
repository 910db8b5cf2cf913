use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Local store key holding the JSON-encoded [`AdminSession`].
pub const ADMIN_SESSION_KEY: &str = "goldenglass_admin_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    CheckingSession,
    Authenticated,
}

/// Logged-in admin, as persisted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(username: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self { username: username.into(), logged_in_at: at }
    }

    /// Valid while less than `ttl` has passed since login.
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.logged_in_at) < ttl
    }
}
