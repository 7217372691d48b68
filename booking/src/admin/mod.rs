//! Password-gated admin operations.
//!
//! [`AdminConsole`] wraps the admin and catalog services and threads an
//! explicit [`AdminSession`] through every privileged call:
//!
//! ```text
//! login(password) ──► AdminSession ──► dashboard / delete_movie / export_backup
//!                          ▲                          │
//!                          └──── invalidated on 401 ──┘
//! ```

pub mod backup;
pub mod dashboard;
pub mod session;

pub use backup::{backup_file_name, write_backup, BackupExport};
pub use dashboard::{AdminDashboard, DashboardOverview};
pub use session::{AdminSession, DEFAULT_SESSION_TTL};

use crate::services::{AdminService, CatalogService, ServiceError};
use crate::types::MovieId;
use cinema_core::environment::Clock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Admin operations over injected services.
#[derive(Clone)]
pub struct AdminConsole {
    admin: Arc<dyn AdminService>,
    catalog: Arc<dyn CatalogService>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
    backup_dir: PathBuf,
}

impl AdminConsole {
    /// Create a console with the default session lifetime, writing backups
    /// into the working directory.
    #[must_use]
    pub fn new(
        admin: Arc<dyn AdminService>,
        catalog: Arc<dyn CatalogService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            admin,
            catalog,
            clock,
            session_ttl: DEFAULT_SESSION_TTL,
            backup_dir: PathBuf::from("."),
        }
    }

    /// Override how long a login lasts
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Override where backups are written
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Log in with the admin password.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::MissingPassword`] for a blank password, without
    ///   contacting the service
    /// - [`ServiceError::Unauthorized`] for a wrong password
    pub async fn login(&self, password: &str) -> Result<AdminSession, ServiceError> {
        if password.trim().is_empty() {
            return Err(ServiceError::MissingPassword);
        }

        let token = self.admin.login(password).await?;
        let session = AdminSession::new(token, self.clock.now(), self.session_ttl);
        tracing::info!(expires_at = %session.expires_at(), "Admin logged in");
        Ok(session)
    }

    /// Load the dashboard: overview, movies and bookings, fetched together.
    ///
    /// # Errors
    ///
    /// Fails if any of the three fetches fails. An `Unauthorized` answer
    /// invalidates `session`.
    pub async fn dashboard(
        &self,
        session: &mut AdminSession,
    ) -> Result<AdminDashboard, ServiceError> {
        let admin = Arc::clone(&self.admin);
        let catalog = Arc::clone(&self.catalog);

        session
            .authorized(self.clock.now(), |token| async move {
                let (overview, movies, bookings) = tokio::try_join!(
                    admin.dashboard(&token),
                    catalog.list_movies(),
                    admin.list_bookings(&token),
                )?;
                Ok(AdminDashboard {
                    overview,
                    movies,
                    bookings,
                })
            })
            .await
    }

    /// Remove a movie from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown movies. An
    /// `Unauthorized` answer invalidates `session`.
    pub async fn delete_movie(
        &self,
        session: &mut AdminSession,
        id: &MovieId,
    ) -> Result<(), ServiceError> {
        let admin = Arc::clone(&self.admin);
        session
            .authorized(self.clock.now(), |token| async move {
                admin.delete_movie(&token, id).await
            })
            .await?;

        tracing::info!(movie_id = %id, "Movie deleted");
        Ok(())
    }

    /// Fetch a full backup and write it into the backup directory.
    ///
    /// # Errors
    ///
    /// Fails if the backup cannot be fetched or written. An `Unauthorized`
    /// answer invalidates `session`.
    pub async fn export_backup(
        &self,
        session: &mut AdminSession,
    ) -> Result<BackupExport, ServiceError> {
        let admin = Arc::clone(&self.admin);
        let backup = session
            .authorized(self.clock.now(), |token| async move { admin.backup(&token).await })
            .await?;

        write_backup(&self.backup_dir, self.clock.now().date_naive(), &backup).await
    }

    /// End the session.
    pub fn logout(session: &mut AdminSession) {
        session.invalidate();
    }
}
