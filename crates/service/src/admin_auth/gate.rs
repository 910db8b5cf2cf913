use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use configs::AdminConfig;

use super::domain::{AdminSession, GateState, ADMIN_SESSION_KEY};
use super::errors::AdminAuthError;
use super::password::PasswordScheme;
use crate::facade::LocalStore;

/// Gate in front of the admin screens.
///
/// Session expiry is only checked by [`AdminGate::mount`]; once
/// authenticated the gate stays authenticated until logout or the next mount.
pub struct AdminGate {
    username: String,
    password_hash: String,
    scheme: PasswordScheme,
    ttl: Duration,
    local: Arc<dyn LocalStore>,
    state: RwLock<(GateState, Option<AdminSession>)>,
}

impl AdminGate {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        scheme: PasswordScheme,
        ttl: Duration,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            scheme,
            ttl,
            local,
            state: RwLock::new((GateState::Unauthenticated, None)),
        }
    }

    pub fn from_config(cfg: &AdminConfig, local: Arc<dyn LocalStore>) -> Self {
        Self::new(
            cfg.username.clone(),
            cfg.password_hash.clone(),
            cfg.password_scheme.into(),
            Duration::hours(cfg.session_ttl_hours),
            local,
        )
    }

    pub async fn state(&self) -> GateState {
        self.state.read().await.0
    }

    pub async fn session(&self) -> Option<AdminSession> {
        self.state.read().await.1.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state().await == GateState::Authenticated
    }

    pub async fn mount(&self) -> GateState {
        self.mount_at(Utc::now()).await
    }

    /// Restore a stored session if it is still valid at `now`; an expired or
    /// unreadable one is removed.
    pub async fn mount_at(&self, now: DateTime<Utc>) -> GateState {
        *self.state.write().await = (GateState::CheckingSession, None);

        let stored = match self.local.get_raw(ADMIN_SESSION_KEY).await {
            Some(raw) => match serde_json::from_str::<AdminSession>(&raw) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!(error = %e, "malformed admin session; discarding");
                    None
                }
            },
            None => None,
        };

        let next = match stored {
            Some(s) if s.is_valid_at(now, self.ttl) => {
                debug!(username = %s.username, "admin session restored");
                (GateState::Authenticated, Some(s))
            }
            other => {
                if other.is_some() {
                    info!("admin session expired");
                }
                self.clear_local().await;
                (GateState::Unauthenticated, None)
            }
        };
        let state = next.0;
        *self.state.write().await = next;
        state
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminSession, AdminAuthError> {
        self.login_at(username, password, Utc::now()).await
    }

    /// Check credentials and start a session stamped `now`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use chrono::Duration;
    /// use service::admin_auth::{legacy_hash, AdminGate, PasswordScheme};
    /// use service::facade::MemoryMirror;
    ///
    /// let gate = AdminGate::new("admin", legacy_hash("pw"), PasswordScheme::Legacy,
    ///     Duration::hours(24), Arc::new(MemoryMirror::new()));
    /// let session = tokio_test::block_on(gate.login("admin", "pw")).unwrap();
    /// assert_eq!(session.username, "admin");
    /// assert!(tokio_test::block_on(gate.is_authenticated()));
    /// ```
    #[instrument(skip(self, password, now))]
    pub async fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, AdminAuthError> {
        if self.password_hash.is_empty() {
            warn!("admin password hash not configured; refusing login");
            return Err(AdminAuthError::NotConfigured);
        }
        if username.trim() != self.username || !self.scheme.verify(password, &self.password_hash)? {
            info!("admin login rejected");
            return Err(AdminAuthError::InvalidCredentials);
        }

        let session = AdminSession::new(self.username.clone(), now);
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(e) = self.local.set_raw(ADMIN_SESSION_KEY, raw).await {
                    warn!(error = %e, "admin session not persisted; valid until next mount");
                }
            }
            Err(e) => warn!(error = %e, "admin session does not serialize"),
        }
        *self.state.write().await = (GateState::Authenticated, Some(session.clone()));
        info!("admin logged in");
        Ok(session)
    }

    pub async fn logout(&self) {
        self.clear_local().await;
        *self.state.write().await = (GateState::Unauthenticated, None);
        info!("admin logged out");
    }

    async fn clear_local(&self) {
        if let Err(e) = self.local.remove(ADMIN_SESSION_KEY).await {
            warn!(error = %e, "failed to clear admin session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::MemoryMirror;
    use crate::admin_auth::password::legacy_hash;

    fn gate(local: Arc<MemoryMirror>) -> AdminGate {
        AdminGate::new(
            "admin",
            legacy_hash("golden"),
            PasswordScheme::Legacy,
            Duration::hours(24),
            local,
        )
    }

    async fn store_session(local: &MemoryMirror, at: DateTime<Utc>) {
        let raw = serde_json::to_string(&AdminSession::new("admin", at)).unwrap();
        local.set_raw(ADMIN_SESSION_KEY, raw).await.unwrap();
    }

    #[tokio::test]
    async fn mount_restores_recent_session_only() {
        let now = Utc::now();
        let local = Arc::new(MemoryMirror::new());

        store_session(&local, now - Duration::hours(1)).await;
        let g = gate(local.clone());
        assert_eq!(g.state().await, GateState::Unauthenticated);
        assert_eq!(g.mount_at(now).await, GateState::Authenticated);

        store_session(&local, now - Duration::hours(25)).await;
        let g = gate(local.clone());
        assert_eq!(g.mount_at(now).await, GateState::Unauthenticated);
        assert!(local.get_raw(ADMIN_SESSION_KEY).await.is_none());
    }

    #[tokio::test]
    async fn expiry_mid_use_needs_a_remount() {
        let start = Utc::now();
        let local = Arc::new(MemoryMirror::new());
        let g = gate(local.clone());
        g.login_at("admin", "golden", start).await.unwrap();

        // nothing re-checks the clock until the next mount
        assert!(g.is_authenticated().await);
        assert_eq!(g.mount_at(start + Duration::hours(30)).await, GateState::Unauthenticated);
    }

    #[tokio::test]
    async fn wrong_credentials_and_logout() {
        let local = Arc::new(MemoryMirror::new());
        let g = gate(local.clone());
        assert!(matches!(g.login("admin", "nope").await, Err(AdminAuthError::InvalidCredentials)));
        assert!(matches!(g.login("root", "golden").await, Err(AdminAuthError::InvalidCredentials)));

        g.login("admin", "golden").await.unwrap();
        assert!(local.get_raw(ADMIN_SESSION_KEY).await.is_some());
        g.logout().await;
        assert_eq!(g.state().await, GateState::Unauthenticated);
        assert!(g.session().await.is_none());
        assert!(local.get_raw(ADMIN_SESSION_KEY).await.is_none());
    }

    #[tokio::test]
    async fn malformed_session_is_discarded() {
        let local = Arc::new(MemoryMirror::new());
        local.set_raw(ADMIN_SESSION_KEY, "{oops".into()).await.unwrap();
        let g = gate(local.clone());
        assert_eq!(g.mount().await, GateState::Unauthenticated);
        assert!(local.get_raw(ADMIN_SESSION_KEY).await.is_none());
    }

    #[tokio::test]
    async fn unconfigured_hash_refuses_login() {
        let g = AdminGate::from_config(&AdminConfig::default(), Arc::new(MemoryMirror::new()));
        assert!(matches!(g.login("admin", "").await, Err(AdminAuthError::NotConfigured)));
    }
}
