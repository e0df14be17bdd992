//! Dashboard error types

use thiserror::Error;

/// Errors raised while setting up the dashboard page
#[derive(Error, Debug, PartialEq)]
pub enum DashboardError {
    /// A dataset does not have one value per label
    #[error("Chart '{chart}' dataset '{dataset}' has {actual} values for {expected} labels")]
    InvalidChart {
        chart: String,
        dataset: String,
        expected: usize,
        actual: usize,
    },

    /// A dashboard setting is out of range
    #[error("Invalid dashboard setting: {0}")]
    InvalidSetting(String),
}
