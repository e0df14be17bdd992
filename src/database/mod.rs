//! Database bootstrap
//!
//! Establishes exactly one live connection at startup. The configured primary
//! endpoint is tried first; if it fails for any reason an ephemeral in-process
//! SQLite instance is provisioned instead. If that fails too the caller gets
//! [`DatabaseError::Unrecoverable`] and the binary exits with code 1.
//!
//! Both paths are [`ConnectionStrategy`] implementations injected into the
//! [`DatabaseConnector`], so the fallback sequence can be exercised without a
//! network.

mod connector;
mod error;
mod strategy;
mod uri;

pub use connector::DatabaseConnector;
pub use error::{DatabaseError, DatabaseResult, FATAL_EXIT_CODE};
pub use strategy::{EphemeralInstance, PrimaryEndpoint};
pub use uri::{DatabaseUri, HostPort};

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tokio::net::TcpStream;

/// A way of obtaining a live database connection
#[async_trait]
pub trait ConnectionStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Attempt to establish a connection
    async fn establish(&self) -> DatabaseResult<ConnectionHandle>;
}

/// Which strategy produced a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOrigin {
    Primary,
    Ephemeral,
}

/// The underlying live connection
pub enum Backend {
    /// Accepted TCP connection to a network database
    Remote(TcpStream),
    /// Existing SQLite database file
    Sqlite(Connection),
    /// In-memory instance; `keeper` holds the shared cache alive
    Ephemeral {
        conn: Connection,
        keeper: Connection,
    },
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Remote(stream) => f
                .debug_tuple("Remote")
                .field(&stream.peer_addr().ok())
                .finish(),
            Backend::Sqlite(_) => f.write_str("Sqlite"),
            Backend::Ephemeral { .. } => f.write_str("Ephemeral"),
        }
    }
}

/// A live connection plus where it came from
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Connection URI with any password masked
    uri: String,
    /// Loggable host or instance name
    host: String,
    origin: ConnectionOrigin,
    connected_at: DateTime<Utc>,
    backend: Backend,
}

impl ConnectionHandle {
    pub fn new(
        origin: ConnectionOrigin,
        uri: impl Into<String>,
        host: impl Into<String>,
        backend: Backend,
    ) -> Self {
        Self {
            uri: uri.into(),
            host: host.into(),
            origin,
            connected_at: Utc::now(),
            backend,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn origin(&self) -> ConnectionOrigin {
        self.origin
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn is_ephemeral(&self) -> bool {
        self.origin == ConnectionOrigin::Ephemeral
    }

    /// Whether the backend still answers
    ///
    /// TCP connections are live while the peer address is still known;
    /// SQLite connections while a trivial query succeeds.
    pub fn is_live(&self) -> bool {
        match &self.backend {
            Backend::Remote(stream) => stream.peer_addr().is_ok(),
            Backend::Sqlite(conn) | Backend::Ephemeral { conn, .. } => conn
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .is_ok(),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// SQLite connection, if this handle has one
    pub fn sqlite(&self) -> Option<&Connection> {
        match &self.backend {
            Backend::Sqlite(conn) | Backend::Ephemeral { conn, .. } => Some(conn),
            Backend::Remote(_) => None,
        }
    }
}
