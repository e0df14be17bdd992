//! Counter Animation
//!
//! Elements with class `counter` and a `data-target` attribute count up from
//! their displayed value to the target. A target written with a decimal point
//! animates in tenths; anything else animates in whole numbers.
//!
//! Each element gets its own [`CounterAnimation`]. The animation only knows
//! how to take one step; the page schedules the steps.

use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{Document, Element, NodeId};

/// Class marking an animated counter
pub const COUNTER_CLASS: &str = "counter";

/// Attribute holding the counter target
pub const TARGET_ATTR: &str = "data-target";

/// Read the leading number out of a string, ignoring trailing text
///
/// `"85+"` reads as 85, `" 2.4 ppm"` as 2.4, `"n/a"` as nothing.
pub fn parse_numeric_prefix(text: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("numeric prefix pattern is valid")
    });

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Format a value the way the counter displays it
pub fn format_display(value: f64, decimal: bool) -> String {
    if decimal {
        format!("{:.1}", value)
    } else {
        format!("{:.0}", value)
    }
}

/// A counter element and the value it animates towards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterTarget {
    pub element: NodeId,
    pub target: f64,
    /// One decimal place instead of whole numbers
    pub decimal: bool,
}

impl CounterTarget {
    /// Read the target from an element's markup
    ///
    /// Returns `None` for a missing, blank, non-numeric or non-positive
    /// target; such elements are never animated.
    pub fn from_element(node: NodeId, element: &Element) -> Option<Self> {
        let raw = element.attribute(TARGET_ATTR)?;
        let target = parse_numeric_prefix(raw)?;
        if target <= 0.0 {
            return None;
        }

        Some(Self {
            element: node,
            target,
            decimal: raw.contains('.'),
        })
    }

    /// Final text shown once the animation stops
    pub fn pinned_display(&self) -> String {
        if self.decimal {
            format_display(self.target, true)
        } else {
            format_display(self.target.round(), false)
        }
    }
}

/// Result of one animation step
#[derive(Debug, Clone, PartialEq)]
pub enum CounterStep {
    /// Display updated; another tick is due
    Advanced(String),
    /// Display pinned to the target; the animation is over
    Pinned(String),
}

impl CounterStep {
    /// Text written to the element
    pub fn display(&self) -> &str {
        match self {
            CounterStep::Advanced(text) | CounterStep::Pinned(text) => text,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, CounterStep::Pinned(_))
    }
}

/// Running state of one counter
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAnimation {
    target: CounterTarget,
    current: f64,
    ticks: u32,
    finished: bool,
}

impl CounterAnimation {
    /// Start from the value currently displayed (0 if it is not a number)
    pub fn new(target: CounterTarget, displayed: &str) -> Self {
        Self {
            target,
            current: parse_numeric_prefix(displayed).unwrap_or(0.0),
            ticks: 0,
            finished: false,
        }
    }

    pub fn target(&self) -> &CounterTarget {
        &self.target
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Steps taken so far, including the pinning step
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take one step towards the target
    ///
    /// Whole-number counters snap the running value to the displayed
    /// integer; decimal counters keep the exact running sum. The value never
    /// overshoots the target.
    pub fn step(&mut self, speed: f64) -> CounterStep {
        let target = self.target.target;
        self.ticks += 1;

        if self.finished || self.current >= target {
            self.finished = true;
            return CounterStep::Pinned(self.target.pinned_display());
        }

        let inc = target / speed;
        let mut next = if self.target.decimal {
            self.current + inc
        } else {
            (self.current + inc).ceil()
        };
        if !(next > self.current) {
            next = target;
        }

        self.current = next.min(target);
        CounterStep::Advanced(format_display(self.current, self.target.decimal))
    }
}

/// All counters on a page
#[derive(Debug, Clone)]
pub struct CounterAnimator {
    speed: f64,
    animations: Vec<CounterAnimation>,
}

impl CounterAnimator {
    /// Find every animatable counter in the document
    pub fn discover(document: &Document, speed: f64) -> Self {
        let animations: Vec<_> = document
            .query_class(COUNTER_CLASS)
            .into_iter()
            .filter_map(|node| {
                let element = document.get(node)?;
                let target = CounterTarget::from_element(node, element)?;
                Some(CounterAnimation::new(target, &element.text))
            })
            .collect();

        tracing::debug!(counters = animations.len(), "Discovered counters");

        Self { speed, animations }
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn animation(&self, index: usize) -> Option<&CounterAnimation> {
        self.animations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CounterAnimation> {
        self.animations.iter()
    }

    /// Whether every counter has reached its target
    pub fn all_finished(&self) -> bool {
        self.animations.iter().all(CounterAnimation::is_finished)
    }

    /// Step one counter and write the result into the document
    ///
    /// Returns `Some(true)` when another tick should be scheduled.
    pub fn tick(&mut self, index: usize, document: &mut Document) -> Option<bool> {
        let animation = self.animations.get_mut(index)?;
        if animation.is_finished() {
            return Some(false);
        }

        let step = animation.step(self.speed);
        if let Some(element) = document.get_mut(animation.target().element) {
            element.text = step.display().to_string();
        }

        if step.is_finished() {
            tracing::trace!(
                counter = index,
                ticks = animation.ticks(),
                "Counter reached target {}",
                step.display()
            );
        }

        Some(!step.is_finished())
    }
}
