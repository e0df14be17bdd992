//! Dashboard Page
//!
//! Wires the page behaviors together the way the browser would on
//! `DOMContentLoaded`, and owns the timer queue that drives them.

use std::time::Duration;

use super::analyze::{self, AnalyzeForm, FormSessionState, SubmitOutcome};
use super::charts::{ChartBootstrap, ChartRenderer, COMPARISON_SURFACE, TREND_SURFACE};
use super::counter::{CounterAnimator, COUNTER_CLASS, TARGET_ATTR};
use super::error::DashboardError;
use super::DashboardEvent;
use crate::config::DashboardConfig;
use crate::dom::{Document, Element};
use crate::scheduler::TimerQueue;

/// `onclick` value that triggers the global form reset
pub const RESET_ACTION: &str = "resetForm()";

/// A loaded dashboard page
pub struct Dashboard {
    document: Document,
    config: DashboardConfig,
    timers: TimerQueue<DashboardEvent>,
    counters: CounterAnimator,
    analyze: Option<AnalyzeForm>,
    charts_rendered: usize,
}

impl Dashboard {
    /// Load a page: start counters, build charts, attach the analyze form
    pub fn load(
        document: Document,
        config: DashboardConfig,
        renderer: Option<&mut dyn ChartRenderer>,
    ) -> Result<Self, DashboardError> {
        if !(config.counter_speed.is_finite() && config.counter_speed > 0.0) {
            return Err(DashboardError::InvalidSetting(format!(
                "counter_speed must be a positive number, got {}",
                config.counter_speed
            )));
        }

        let counters = CounterAnimator::discover(&document, config.counter_speed);
        let charts_rendered = ChartBootstrap::run(&document, renderer);
        let analyze = AnalyzeForm::attach(&document, &config);

        let mut dashboard = Self {
            document,
            config,
            timers: TimerQueue::new(),
            counters,
            analyze,
            charts_rendered,
        };

        // First tick of every counter runs immediately
        for index in 0..dashboard.counters.len() {
            dashboard.tick_counter(index);
        }

        tracing::info!(
            counters = dashboard.counters.len(),
            charts = dashboard.charts_rendered,
            analyze_form = dashboard.analyze.is_some(),
            "Dashboard loaded"
        );

        Ok(dashboard)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable page access, e.g. to type into form fields
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Current virtual time (ms since load)
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    pub fn charts_rendered(&self) -> usize {
        self.charts_rendered
    }

    /// Analyze form state, if the page has the form
    pub fn form_state(&self) -> Option<FormSessionState> {
        self.analyze.as_ref().map(AnalyzeForm::state)
    }

    /// Submit the analyze form
    pub fn submit_analyze(&mut self) -> Option<SubmitOutcome> {
        let form = self.analyze.as_mut()?;
        form.submit(&mut self.document, &mut self.timers)
    }

    /// Restore the analyze form to its initial state
    pub fn reset_form(&mut self) {
        if let Some(form) = self.analyze.as_mut() {
            form.reset(&mut self.document, &mut self.timers);
        }
    }

    /// Click an element, running its markup action if it has one
    ///
    /// Returns `true` if an action ran.
    pub fn click(&mut self, id: &str) -> bool {
        let action = self
            .document
            .by_id(id)
            .and_then(|e| e.attribute("onclick"))
            .map(|a| a.trim().to_string());

        match action.as_deref() {
            Some(RESET_ACTION) => {
                self.reset_form();
                true
            }
            Some(other) => {
                tracing::debug!(element = id, action = other, "Unknown click action");
                false
            }
            None => false,
        }
    }

    /// Advance virtual time by `ms`, firing every timer that comes due
    ///
    /// Returns the number of timers fired.
    pub fn advance(&mut self, ms: u64) -> usize {
        let until = self.timers.now().saturating_add(ms);
        self.advance_to(until)
    }

    /// Advance virtual time to `until`, firing every timer that comes due
    pub fn advance_to(&mut self, until: u64) -> usize {
        let mut fired = 0;
        while let Some((_, event)) = self.timers.pop_due(until) {
            self.dispatch(event);
            fired += 1;
        }
        self.timers.set_now(until);
        fired
    }

    /// Fire timers in virtual time until none are left
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline() {
            fired += self.advance_to(deadline);
        }
        fired
    }

    /// Fire timers against the wall clock until none are left
    pub async fn run_realtime(&mut self) -> usize {
        let origin = self.timers.now();
        let started = tokio::time::Instant::now();
        let mut fired = 0;

        while let Some(deadline) = self.timers.next_deadline() {
            let offset = Duration::from_millis(deadline.saturating_sub(origin));
            tokio::time::sleep_until(started + offset).await;
            fired += self.advance_to(deadline);
        }

        fired
    }

    fn dispatch(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::CounterTick(index) => self.tick_counter(index),
            DashboardEvent::AnalysisComplete { session } => {
                if let Some(form) = self.analyze.as_mut() {
                    form.complete(&mut self.document, session);
                }
            }
        }
    }

    fn tick_counter(&mut self, index: usize) {
        if self.counters.tick(index, &mut self.document) == Some(true) {
            self.timers
                .schedule(self.config.counter_tick_ms, DashboardEvent::CounterTick(index));
        }
    }
}

/// Global form reset, reachable from markup actions and from code alike
pub fn reset_form(dashboard: &mut Dashboard) {
    dashboard.reset_form();
}

/// The demo dashboard page: headline counters, both chart surfaces and the
/// analyze form
pub fn demo_document() -> Document {
    let mut doc = Document::new();

    for (label, target) in [
        ("Chemicals analyzed", "1250"),
        ("Prediction accuracy", "94.7"),
        ("Safer alternatives", "340"),
        ("Avg toxicity score", "2.4"),
    ] {
        doc.append(
            Element::new("span")
                .class(COUNTER_CLASS)
                .attr(TARGET_ATTR, target)
                .attr("aria-label", label)
                .text("0"),
        );
    }

    doc.append(Element::new("canvas").id(TREND_SURFACE));
    doc.append(Element::new("canvas").id(COMPARISON_SURFACE));

    doc.append(Element::new("h2").id(analyze::TITLE_ID).text(analyze::IDLE_TITLE));
    let form = doc.append(Element::new("form").id(analyze::FORM_ID));
    doc.append_child(form, Element::new("input").id(analyze::NAME_INPUT_ID));
    doc.append_child(form, Element::new("input").id("casNumber"));
    doc.append_child(form, Element::new("select").id("useCase").value("packaging"));
    doc.append(Element::new("div").id(analyze::LOADING_ID).display("none"));
    let results = doc.append(Element::new("section").id(analyze::RESULTS_ID));
    doc.append_child(
        results,
        Element::new("button")
            .id("resetButton")
            .attr("onclick", RESET_ACTION)
            .text("Analyze Another"),
    );

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::analyze::{LOADING_ID, NAME_INPUT_ID, RESULTS_ID, TITLE_ID};
    use crate::dashboard::charts::ChartConfig;

    #[derive(Default)]
    struct CountingRenderer {
        renders: usize,
    }

    impl ChartRenderer for CountingRenderer {
        fn render(&mut self, _surface: &str, _config: &ChartConfig) {
            self.renders += 1;
        }
    }

    fn counter_texts(dashboard: &Dashboard) -> Vec<String> {
        dashboard
            .document()
            .query_class(COUNTER_CLASS)
            .into_iter()
            .filter_map(|n| dashboard.document().get(n))
            .map(|e| e.text.clone())
            .collect()
    }

    fn title(dashboard: &Dashboard) -> String {
        dashboard.document().by_id(TITLE_ID).unwrap().text.clone()
    }

    fn load_demo() -> Dashboard {
        Dashboard::load(demo_document(), DashboardConfig::default(), None).unwrap()
    }

    #[test]
    fn test_load_renders_charts_once() {
        let mut renderer = CountingRenderer::default();
        let dashboard =
            Dashboard::load(demo_document(), DashboardConfig::default(), Some(&mut renderer))
                .unwrap();
        assert_eq!(dashboard.charts_rendered(), 2);
        assert_eq!(renderer.renders, 2);

        let dashboard = load_demo();
        assert_eq!(dashboard.charts_rendered(), 0);
    }

    #[test]
    fn test_rejects_bad_speed() {
        for speed in [0.0, -1.0, f64::NAN] {
            let config = DashboardConfig {
                counter_speed: speed,
                ..Default::default()
            };
            assert!(matches!(
                Dashboard::load(demo_document(), config, None),
                Err(DashboardError::InvalidSetting(_))
            ));
        }
    }

    #[test]
    fn test_first_counter_tick_runs_on_load() {
        let dashboard = load_demo();
        // 1250 / 200 = 6.25 → 7; 94.7 / 200 → 0.47 → "0.5"
        assert_eq!(counter_texts(&dashboard), vec!["7", "0.5", "2", "0.0"]);
        assert_eq!(dashboard.pending_timers(), 4);
    }

    #[test]
    fn test_counters_finish_at_targets() {
        let mut dashboard = load_demo();
        let fired = dashboard.run_until_idle();

        assert!(fired > 0);
        assert!(dashboard.counters().all_finished());
        assert_eq!(counter_texts(&dashboard), vec!["1250", "94.7", "340", "2.4"]);
        assert_eq!(dashboard.pending_timers(), 0);
    }

    #[test]
    fn test_counter_ticks_every_fifteen_ms() {
        let mut doc = Document::new();
        doc.append(Element::new("span").class(COUNTER_CLASS).attr(TARGET_ATTR, "85"));
        let mut dashboard = Dashboard::load(doc, DashboardConfig::default(), None).unwrap();

        assert_eq!(counter_texts(&dashboard), vec!["1"]);
        assert_eq!(dashboard.advance(14), 0);
        assert_eq!(dashboard.advance(1), 1);
        assert_eq!(counter_texts(&dashboard), vec!["2"]);

        // 86 steps in total, the first at load
        assert_eq!(dashboard.run_until_idle(), 84);
        assert_eq!(dashboard.now(), 85 * 15);
        assert_eq!(counter_texts(&dashboard), vec!["85"]);
    }

    #[test]
    fn test_page_without_counters_schedules_nothing() {
        let mut doc = Document::new();
        doc.append(Element::new("span").class(COUNTER_CLASS).attr(TARGET_ATTR, "0"));
        let dashboard = Dashboard::load(doc, DashboardConfig::default(), None).unwrap();
        assert!(dashboard.counters().is_empty());
        assert_eq!(dashboard.pending_timers(), 0);
    }

    #[test]
    fn test_analyze_round_trip_through_page() {
        let mut dashboard = load_demo();
        dashboard.run_until_idle();
        let start = dashboard.now();

        dashboard.document_mut().set_value(NAME_INPUT_ID, "Bisphenol A");
        let outcome = dashboard.submit_analyze().unwrap();
        assert!(outcome.default_prevented);
        assert_eq!(dashboard.form_state(), Some(FormSessionState::Loading));

        dashboard.advance(1799);
        assert_eq!(dashboard.form_state(), Some(FormSessionState::Loading));
        dashboard.advance(1);
        assert_eq!(dashboard.form_state(), Some(FormSessionState::ShowingResults));
        assert_eq!(dashboard.now(), start + 1800);
        assert_eq!(title(&dashboard), "Analysis Results: Bisphenol A");

        assert!(dashboard.click("resetButton"));
        assert_eq!(dashboard.form_state(), Some(FormSessionState::Idle));
        assert_eq!(title(&dashboard), analyze::IDLE_TITLE);
        assert_eq!(dashboard.document().value_of(NAME_INPUT_ID), Some(""));
        assert!(!dashboard
            .document()
            .by_id(RESULTS_ID)
            .unwrap()
            .has_class(analyze::RESULTS_VISIBLE_CLASS));
    }

    #[test]
    fn test_global_reset_mid_analysis() {
        let mut dashboard = load_demo();
        dashboard.submit_analyze().unwrap();
        dashboard.advance(900);

        reset_form(&mut dashboard);
        reset_form(&mut dashboard);
        assert_eq!(dashboard.form_state(), Some(FormSessionState::Idle));
        assert!(dashboard.document().by_id(LOADING_ID).unwrap().is_hidden());

        dashboard.run_until_idle();
        assert_eq!(dashboard.form_state(), Some(FormSessionState::Idle));
        assert_eq!(title(&dashboard), analyze::IDLE_TITLE);
    }

    #[test]
    fn test_click_without_action() {
        let mut dashboard = load_demo();
        assert!(!dashboard.click("chemName"));
        assert!(!dashboard.click("missing"));
    }

    #[test]
    fn test_page_without_form() {
        let mut dashboard =
            Dashboard::load(Document::new(), DashboardConfig::default(), None).unwrap();
        assert_eq!(dashboard.form_state(), None);
        assert!(dashboard.submit_analyze().is_none());
        dashboard.reset_form();
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_driver_follows_the_clock() {
        let mut doc = demo_document();
        doc.set_value(NAME_INPUT_ID, "Styrene");
        let config = DashboardConfig {
            counter_speed: 10.0,
            ..Default::default()
        };
        let mut dashboard = Dashboard::load(doc, config, None).unwrap();
        dashboard.run_realtime().await;

        dashboard.submit_analyze().unwrap();
        let before = dashboard.now();
        let started = tokio::time::Instant::now();
        dashboard.run_realtime().await;

        assert!(started.elapsed() >= Duration::from_millis(1800));
        assert_eq!(dashboard.now() - before, 1800);
        assert_eq!(title(&dashboard), "Analysis Results: Styrene");
    }
}
