//! Primary-then-fallback connection sequence

use tracing::{error, info, warn};

use super::error::{DatabaseError, DatabaseResult};
use super::strategy::{EphemeralInstance, PrimaryEndpoint};
use super::{ConnectionHandle, ConnectionStrategy};
use crate::config::DatabaseConfig;

/// Establishes the single startup connection
pub struct DatabaseConnector {
    primary: Box<dyn ConnectionStrategy>,
    fallback: Box<dyn ConnectionStrategy>,
}

impl DatabaseConnector {
    pub fn new(
        primary: Box<dyn ConnectionStrategy>,
        fallback: Box<dyn ConnectionStrategy>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Configured primary endpoint with an ephemeral in-memory fallback
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            Box::new(PrimaryEndpoint::from_config(config)),
            Box::new(EphemeralInstance::new()),
        )
    }

    /// Try the primary once, then the fallback once
    pub async fn connect(&self) -> DatabaseResult<ConnectionHandle> {
        let primary_err = match self.primary.establish().await {
            Ok(handle) => {
                info!(
                    strategy = self.primary.name(),
                    host = handle.host(),
                    "Connected to database"
                );
                return Ok(handle);
            }
            Err(e) => e,
        };

        warn!(
            strategy = self.primary.name(),
            error = %primary_err,
            "Primary database unavailable, falling back to {}",
            self.fallback.name()
        );

        match self.fallback.establish().await {
            Ok(handle) => {
                info!(
                    strategy = self.fallback.name(),
                    instance = handle.host(),
                    "Connected to fallback database; data will reset on restart"
                );
                Ok(handle)
            }
            Err(fallback_err) => {
                error!(
                    strategy = self.fallback.name(),
                    error = %fallback_err,
                    "Fallback database failed"
                );
                Err(DatabaseError::Unrecoverable {
                    primary: Box::new(primary_err),
                    fallback: Box::new(fallback_err),
                })
            }
        }
    }
}
