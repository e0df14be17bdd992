//! # ChemDash
//!
//! Headless model of a chemical-analysis dashboard plus the database
//! bootstrap used by its backend.
//!
//! ## Features
//!
//! - **Counter animations**: `data-target` counters that count up every 15ms and pin at their target
//! - **Charts**: the toxicity trend and performance comparison charts as serializable configs
//! - **Analyze form**: Idle → Loading → ShowingResults with cancellable stale completions
//! - **Database bootstrap**: primary endpoint first, ephemeral in-memory SQLite as fallback
//!
//! ## Modules
//!
//! - [`dom`]: Minimal element tree the page behaviors act on
//! - [`scheduler`]: Virtual-time timer queue
//! - [`dashboard`]: Counters, charts, analyze form and page wiring
//! - [`database`]: Connection strategies and the connector
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chemdash::config::DashboardConfig;
//! use chemdash::dashboard::{demo_document, Dashboard, LogRenderer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut renderer = LogRenderer;
//!     let mut dashboard = Dashboard::load(
//!         demo_document(),
//!         DashboardConfig::default(),
//!         Some(&mut renderer),
//!     )?;
//!
//!     // Play every counter to its target
//!     dashboard.run_until_idle();
//!
//!     dashboard.submit_analyze();
//!     dashboard.advance(1800);
//!     dashboard.reset_form();
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod database;
pub mod dom;
pub mod scheduler;

pub use config::{Config, ConfigError, DashboardConfig, DatabaseConfig, LoggingConfig};

pub use dashboard::{
    AnalyzeForm, ChartConfig, ChartRenderer, CounterAnimator, Dashboard, DashboardError,
    DashboardEvent, FormSessionState, SessionToken,
};

pub use database::{
    ConnectionHandle, ConnectionOrigin, ConnectionStrategy, DatabaseConnector, DatabaseError,
    DatabaseResult, EphemeralInstance, PrimaryEndpoint,
};

pub use dom::{Document, Element, NodeId};

pub use scheduler::{TimerId, TimerQueue};
