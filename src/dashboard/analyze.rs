//! Analyze Form
//!
//! Simulated chemical analysis. Submitting the form shows a loading state;
//! after a fixed delay the results view appears. Resetting restores the
//! empty form.
//!
//! ```text
//! Idle ──submit──► Loading ──delay──► ShowingResults
//!  ▲                  │                    │
//!  └──────reset───────┴────────reset───────┘
//! ```
//!
//! Every submission gets a [`SessionToken`]. When stale-analysis
//! cancellation is on, reset cancels the pending completion and moves the
//! token on, so a completion from an earlier submission can never reveal
//! results on a freshly reset form.

use std::collections::BTreeMap;

use super::DashboardEvent;
use crate::config::DashboardConfig;
use crate::dom::Document;
use crate::scheduler::{TimerId, TimerQueue};

pub const FORM_ID: &str = "analyzeForm";
pub const NAME_INPUT_ID: &str = "chemName";
pub const TITLE_ID: &str = "cardTitle";
pub const LOADING_ID: &str = "loadingOverlay";
pub const RESULTS_ID: &str = "resultsSection";

/// Class that reveals the results view
pub const RESULTS_VISIBLE_CLASS: &str = "show";

pub const IDLE_TITLE: &str = "Analyze Chemical Form";
pub const LOADING_TITLE: &str = "Analyzing...";
pub const RESULTS_TITLE_PREFIX: &str = "Analysis Results: ";

/// Identifies one submit cycle
pub type SessionToken = u64;

/// Where the form is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSessionState {
    Idle,
    Loading,
    ShowingResults,
}

/// What a submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub session: SessionToken,
    /// Chemical name the results will be titled with
    pub name: String,
    /// The page navigation a plain form submit would cause was suppressed
    pub default_prevented: bool,
}

#[derive(Debug, Clone)]
struct PendingAnalysis {
    name: String,
    timer: TimerId,
}

/// Analyze form state machine
#[derive(Debug, Clone)]
pub struct AnalyzeForm {
    delay_ms: u64,
    default_name: String,
    cancel_stale: bool,
    state: FormSessionState,
    session: SessionToken,
    pending: BTreeMap<SessionToken, PendingAnalysis>,
}

impl AnalyzeForm {
    /// Attach to the page's analyze form, if it has one
    pub fn attach(document: &Document, config: &DashboardConfig) -> Option<Self> {
        if !document.contains(FORM_ID) {
            return None;
        }

        Some(Self {
            delay_ms: config.analyze_delay_ms,
            default_name: config.default_chemical_name.clone(),
            cancel_stale: config.cancel_stale_analysis,
            state: FormSessionState::Idle,
            session: 0,
            pending: BTreeMap::new(),
        })
    }

    pub fn state(&self) -> FormSessionState {
        self.state
    }

    /// Current session token
    pub fn session(&self) -> SessionToken {
        self.session
    }

    /// Number of completions still scheduled
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Handle a form submission
    ///
    /// Only accepted while idle; otherwise the form is hidden and there is
    /// nothing to submit, so `None` is returned.
    pub fn submit(
        &mut self,
        document: &mut Document,
        timers: &mut TimerQueue<DashboardEvent>,
    ) -> Option<SubmitOutcome> {
        if self.state != FormSessionState::Idle {
            tracing::debug!(state = ?self.state, "Ignoring submit outside idle state");
            return None;
        }

        let name = document
            .value_of(NAME_INPUT_ID)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.default_name)
            .to_string();

        document.set_display(FORM_ID, "none");
        document.set_text(TITLE_ID, LOADING_TITLE);
        document.set_display(LOADING_ID, "flex");

        self.session += 1;
        let session = self.session;
        let timer = timers.schedule(self.delay_ms, DashboardEvent::AnalysisComplete { session });
        self.pending.insert(
            session,
            PendingAnalysis {
                name: name.clone(),
                timer,
            },
        );
        self.state = FormSessionState::Loading;

        tracing::info!(session, chemical = %name, "Analysis started");

        Some(SubmitOutcome {
            session,
            name,
            default_prevented: true,
        })
    }

    /// Finish the analysis started by `session`
    ///
    /// Returns `false` if the completion was stale and nothing changed.
    pub fn complete(&mut self, document: &mut Document, session: SessionToken) -> bool {
        if self.cancel_stale && session != self.session {
            tracing::debug!(session, current = self.session, "Discarding stale analysis");
            self.pending.remove(&session);
            return false;
        }

        let Some(pending) = self.pending.remove(&session) else {
            tracing::debug!(session, "No pending analysis for session");
            return false;
        };

        document.set_display(LOADING_ID, "none");
        document.set_text(TITLE_ID, format!("{}{}", RESULTS_TITLE_PREFIX, pending.name));
        document.add_class(RESULTS_ID, RESULTS_VISIBLE_CLASS);
        self.state = FormSessionState::ShowingResults;

        tracing::info!(session, chemical = %pending.name, "Analysis complete");
        true
    }

    /// Return the form to its initial state
    ///
    /// Safe to call from any state, any number of times.
    pub fn reset(&mut self, document: &mut Document, timers: &mut TimerQueue<DashboardEvent>) {
        if self.cancel_stale {
            let cancelled = std::mem::take(&mut self.pending);
            if !cancelled.is_empty() {
                for pending in cancelled.values() {
                    timers.cancel(pending.timer);
                }
                document.set_display(LOADING_ID, "none");
                tracing::info!(cancelled = cancelled.len(), "Cancelled pending analysis");
            }
            self.session += 1;
        }

        document.remove_class(RESULTS_ID, RESULTS_VISIBLE_CLASS);
        document.set_text(TITLE_ID, IDLE_TITLE);
        document.reset_form(FORM_ID);
        document.set_display(FORM_ID, "block");
        self.state = FormSessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    fn analyze_page() -> Document {
        let mut doc = Document::new();
        doc.append(Element::new("h2").id(TITLE_ID).text(IDLE_TITLE));
        let form = doc.append(Element::new("form").id(FORM_ID));
        doc.append_child(form, Element::new("input").id(NAME_INPUT_ID));
        doc.append_child(form, Element::new("select").id("useCase").value("packaging"));
        doc.append(Element::new("div").id(LOADING_ID).display("none"));
        doc.append(Element::new("section").id(RESULTS_ID));
        doc
    }

    fn setup(cancel_stale: bool) -> (AnalyzeForm, Document, TimerQueue<DashboardEvent>) {
        let doc = analyze_page();
        let config = DashboardConfig {
            cancel_stale_analysis: cancel_stale,
            ..Default::default()
        };
        let form = AnalyzeForm::attach(&doc, &config).unwrap();
        (form, doc, TimerQueue::new())
    }

    fn fire_due(
        form: &mut AnalyzeForm,
        doc: &mut Document,
        timers: &mut TimerQueue<DashboardEvent>,
        until: u64,
    ) {
        while let Some((_, event)) = timers.pop_due(until) {
            if let DashboardEvent::AnalysisComplete { session } = event {
                form.complete(doc, session);
            }
        }
        timers.set_now(until);
    }

    fn title(doc: &Document) -> &str {
        &doc.by_id(TITLE_ID).unwrap().text
    }

    fn results_shown(doc: &Document) -> bool {
        doc.by_id(RESULTS_ID).unwrap().has_class(RESULTS_VISIBLE_CLASS)
    }

    #[test]
    fn test_attach_requires_form() {
        let doc = Document::new();
        assert!(AnalyzeForm::attach(&doc, &DashboardConfig::default()).is_none());
    }

    #[test]
    fn test_submit_enters_loading() {
        let (mut form, mut doc, mut timers) = setup(true);
        doc.set_value(NAME_INPUT_ID, "Bisphenol A");

        let outcome = form.submit(&mut doc, &mut timers).unwrap();
        assert!(outcome.default_prevented);
        assert_eq!(outcome.name, "Bisphenol A");
        assert_eq!(outcome.session, 1);

        assert_eq!(form.state(), FormSessionState::Loading);
        assert!(doc.by_id(FORM_ID).unwrap().is_hidden());
        assert_eq!(doc.by_id(LOADING_ID).unwrap().display.as_deref(), Some("flex"));
        assert_eq!(title(&doc), LOADING_TITLE);
        assert_eq!(timers.next_deadline(), Some(1800));
    }

    #[test]
    fn test_results_appear_after_exact_delay() {
        let (mut form, mut doc, mut timers) = setup(true);
        doc.set_value(NAME_INPUT_ID, "Phthalate");
        form.submit(&mut doc, &mut timers);

        fire_due(&mut form, &mut doc, &mut timers, 1799);
        assert_eq!(form.state(), FormSessionState::Loading);
        assert!(!results_shown(&doc));

        fire_due(&mut form, &mut doc, &mut timers, 1800);
        assert_eq!(form.state(), FormSessionState::ShowingResults);
        assert!(results_shown(&doc));
        assert!(doc.by_id(LOADING_ID).unwrap().is_hidden());
        assert_eq!(title(&doc), "Analysis Results: Phthalate");
    }

    #[test]
    fn test_blank_name_uses_default() {
        let (mut form, mut doc, mut timers) = setup(true);
        doc.set_value(NAME_INPUT_ID, "   ");

        let outcome = form.submit(&mut doc, &mut timers).unwrap();
        assert_eq!(outcome.name, "Unknown Chemical");

        fire_due(&mut form, &mut doc, &mut timers, 1800);
        assert_eq!(title(&doc), "Analysis Results: Unknown Chemical");
    }

    #[test]
    fn test_submit_ignored_unless_idle() {
        let (mut form, mut doc, mut timers) = setup(true);
        form.submit(&mut doc, &mut timers).unwrap();
        assert!(form.submit(&mut doc, &mut timers).is_none());
        assert_eq!(form.pending(), 1);
    }

    #[test]
    fn test_reset_restores_idle_and_is_idempotent() {
        let (mut form, mut doc, mut timers) = setup(true);
        doc.set_value(NAME_INPUT_ID, "Toluene");
        doc.set_value("useCase", "medical");
        form.submit(&mut doc, &mut timers);
        fire_due(&mut form, &mut doc, &mut timers, 1800);

        for _ in 0..3 {
            form.reset(&mut doc, &mut timers);
            assert_eq!(form.state(), FormSessionState::Idle);
            assert!(!results_shown(&doc));
            assert_eq!(title(&doc), IDLE_TITLE);
            assert_eq!(doc.value_of(NAME_INPUT_ID), Some(""));
            assert_eq!(doc.value_of("useCase"), Some("packaging"));
            assert_eq!(doc.by_id(FORM_ID).unwrap().display.as_deref(), Some("block"));
        }
    }

    #[test]
    fn test_reset_from_idle_is_harmless() {
        let (mut form, mut doc, mut timers) = setup(true);
        form.reset(&mut doc, &mut timers);
        assert_eq!(form.state(), FormSessionState::Idle);
        assert_eq!(title(&doc), IDLE_TITLE);
        assert!(timers.is_idle());
    }

    #[test]
    fn test_reset_cancels_pending_analysis() {
        let (mut form, mut doc, mut timers) = setup(true);
        form.submit(&mut doc, &mut timers);

        fire_due(&mut form, &mut doc, &mut timers, 500);
        form.reset(&mut doc, &mut timers);
        assert!(timers.is_idle());
        assert_eq!(form.pending(), 0);
        assert!(doc.by_id(LOADING_ID).unwrap().is_hidden());

        fire_due(&mut form, &mut doc, &mut timers, 5000);
        assert_eq!(form.state(), FormSessionState::Idle);
        assert!(!results_shown(&doc));
        assert_eq!(title(&doc), IDLE_TITLE);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let (mut form, mut doc, mut timers) = setup(true);
        let first = form.submit(&mut doc, &mut timers).unwrap();
        form.reset(&mut doc, &mut timers);

        doc.set_value(NAME_INPUT_ID, "Second");
        let second = form.submit(&mut doc, &mut timers).unwrap();
        assert!(second.session > first.session);

        assert!(!form.complete(&mut doc, first.session));
        assert_eq!(form.state(), FormSessionState::Loading);

        assert!(form.complete(&mut doc, second.session));
        assert_eq!(title(&doc), "Analysis Results: Second");
    }

    #[test]
    fn test_legacy_mode_lets_pending_completion_fire() {
        let (mut form, mut doc, mut timers) = setup(false);
        doc.set_value(NAME_INPUT_ID, "Benzene");
        form.submit(&mut doc, &mut timers);

        fire_due(&mut form, &mut doc, &mut timers, 1000);
        form.reset(&mut doc, &mut timers);
        assert_eq!(form.state(), FormSessionState::Idle);
        assert_eq!(timers.pending(), 1);

        fire_due(&mut form, &mut doc, &mut timers, 1800);
        assert_eq!(form.state(), FormSessionState::ShowingResults);
        assert!(results_shown(&doc));
        assert_eq!(title(&doc), "Analysis Results: Benzene");
    }

    #[test]
    fn test_missing_elements_are_tolerated() {
        let mut doc = Document::new();
        doc.append(Element::new("form").id(FORM_ID));
        let mut form = AnalyzeForm::attach(&doc, &DashboardConfig::default()).unwrap();
        let mut timers = TimerQueue::new();

        let outcome = form.submit(&mut doc, &mut timers).unwrap();
        assert_eq!(outcome.name, "Unknown Chemical");
        assert!(form.complete(&mut doc, outcome.session));
        form.reset(&mut doc, &mut timers);
        assert_eq!(form.state(), FormSessionState::Idle);
    }
}
