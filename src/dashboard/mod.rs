//! ChemDash Dashboard
//!
//! Behavior of the dashboard and analyze pages, driven against a
//! [`Document`](crate::dom::Document):
//!
//! - **counter**: count-up animation for elements tagged with `data-target`
//! - **charts**: the two static demo charts and the renderer capability
//! - **analyze**: the analyze-form state machine
//! - **page**: page-load wiring and the timer-driven event loop
//!
//! # Timeline
//!
//! ```text
//! load ──► counters tick every 15ms ──► pinned at target
//!      └─► charts rendered once
//! submit ──► Loading ──(1800ms)──► ShowingResults ──reset──► Idle
//! ```

pub mod analyze;
pub mod charts;
pub mod counter;
pub mod error;
pub mod page;

pub use analyze::{AnalyzeForm, FormSessionState, SessionToken, SubmitOutcome};
pub use charts::{
    comparison_chart, trend_chart, ChartBootstrap, ChartConfig, ChartDefaults, ChartKind,
    ChartRenderer, LogRenderer, Palette,
};
pub use counter::{CounterAnimation, CounterAnimator, CounterStep, CounterTarget};
pub use error::DashboardError;
pub use page::{demo_document, reset_form, Dashboard};

/// Events carried by the dashboard timer queue
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Advance the counter at this index by one tick
    CounterTick(usize),
    /// A simulated analysis has finished
    AnalysisComplete { session: SessionToken },
}
