//! Admin bearer-token session.

use crate::services::ServiceError;
use chrono::{DateTime, Duration as TimeDelta, Utc};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Default lifetime of an admin session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// An admin login: the bearer token and how long it may be used.
///
/// Privileged calls take the session explicitly. The token is dropped when it
/// expires, when [`AdminSession::invalidate`] is called, or when a privileged
/// call comes back `Unauthorized`.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSession {
    token: Option<String>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Start a session for `token` issued at `issued_at`.
    #[must_use]
    pub fn new(token: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            token: Some(token.into()),
            issued_at,
            expires_at,
        }
    }

    /// The token, if the session is still usable at `now`
    #[must_use]
    pub fn bearer(&self, now: DateTime<Utc>) -> Option<&str> {
        self.token.as_deref().filter(|_| now < self.expires_at)
    }

    /// Whether the session is usable at `now`
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.bearer(now).is_some()
    }

    /// Discard the token. Used on logout and on authorization failures.
    pub fn invalidate(&mut self) {
        if self.token.take().is_some() {
            tracing::info!(issued_at = %self.issued_at, "Admin session invalidated");
        }
    }

    /// When the token was issued
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the token stops being used
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Run a privileged call with this session's token.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::SessionExpired`] without calling `call` if the
    ///   session is not active at `now`
    /// - whatever `call` returns; on [`ServiceError::Unauthorized`] the
    ///   session is invalidated first
    pub async fn authorized<T, F, Fut>(
        &mut self,
        now: DateTime<Utc>,
        call: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let Some(token) = self.bearer(now).map(str::to_string) else {
            tracing::debug!("Privileged call without an active session");
            return Err(ServiceError::SessionExpired);
        };

        let result = call(token).await;
        if matches!(result, Err(ServiceError::Unauthorized)) {
            tracing::warn!("Admin token refused");
            self.invalidate();
        }
        result
    }
}

// Keeps the token out of logs
impl fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSession")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
