//! Projection of counter state onto a presentation surface.
//!
//! The core never holds UI handles. Front-ends implement
//! [`PresentationGateway`] and receive already formatted text plus the
//! adjustment highlight computed by [`AdjustmentHighlight::for_step`].

use serde::{Deserialize, Serialize};

use crate::adjustment::Adjustment;
use crate::counter::{Counter, Progress};
use crate::error::{CounterError, Result};

/// Placeholder substituted with the counter value.
pub const VALUE_PLACEHOLDER: &str = "{value}";
/// Placeholder substituted with the progress percentage.
pub const PERCENT_PLACEHOLDER: &str = "{percent}";

/// Which counter of a project screen is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterSlot {
    /// Stitch counter, present on every project.
    Stitch,
    /// Row counter, present on double-counter projects and carrying progress.
    Row,
}

impl CounterSlot {
    /// Lowercase name used in prompts and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stitch => "stitch",
            Self::Row => "row",
        }
    }
}

/// Active/inactive split of the three adjustment controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentHighlight {
    /// The single highlighted control.
    pub active: Adjustment,
    /// The two controls drawn as inactive, in layout order.
    pub inactive: [Adjustment; 2],
}

impl AdjustmentHighlight {
    /// Highlight for the control matching `step`.
    #[must_use]
    pub const fn for_step(step: Adjustment) -> Self {
        let inactive = match step {
            Adjustment::One => [Adjustment::Five, Adjustment::Ten],
            Adjustment::Five => [Adjustment::One, Adjustment::Ten],
            Adjustment::Ten => [Adjustment::One, Adjustment::Five],
        };
        Self {
            active: step,
            inactive,
        }
    }

    /// Whether `control` is the highlighted one.
    #[must_use]
    pub fn is_active(&self, control: Adjustment) -> bool {
        self.active == control
    }
}

/// Caller supplied templates for counter and progress text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterFormat {
    counter: String,
    progress: String,
}

impl Default for CounterFormat {
    fn default() -> Self {
        Self {
            counter: VALUE_PLACEHOLDER.to_owned(),
            progress: format!("{PERCENT_PLACEHOLDER}%"),
        }
    }
}

impl CounterFormat {
    /// Build a format from templates.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidTemplate`] when a template is missing its
    /// placeholder.
    pub fn new(counter: impl Into<String>, progress: impl Into<String>) -> Result<Self> {
        let format = Self {
            counter: counter.into(),
            progress: progress.into(),
        };
        format.validate()?;
        Ok(format)
    }

    /// Check that both templates carry their placeholder.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidTemplate`] for the first offending template.
    pub fn validate(&self) -> Result<()> {
        ensure_placeholder(&self.counter, VALUE_PLACEHOLDER)?;
        ensure_placeholder(&self.progress, PERCENT_PLACEHOLDER)
    }

    /// Template for the counter text.
    #[must_use]
    pub fn counter_template(&self) -> &str {
        &self.counter
    }

    /// Template for the progress text.
    #[must_use]
    pub fn progress_template(&self) -> &str {
        &self.progress
    }

    /// Counter text for `value`.
    #[must_use]
    pub fn format_counter(&self, value: u32) -> String {
        self.counter.replace(VALUE_PLACEHOLDER, &value.to_string())
    }

    /// Progress text for `percent`.
    #[must_use]
    pub fn format_progress(&self, percent: u32) -> String {
        self.progress
            .replace(PERCENT_PLACEHOLDER, &percent.to_string())
    }
}

fn ensure_placeholder(template: &str, placeholder: &'static str) -> Result<()> {
    if template.contains(placeholder) {
        Ok(())
    } else {
        Err(CounterError::InvalidTemplate {
            template: template.to_owned(),
            placeholder,
        })
    }
}

/// Rendering surface for a counter screen.
pub trait PresentationGateway {
    /// Show the formatted counter value.
    fn render_counter(&mut self, slot: CounterSlot, text: &str);

    /// Show progress; only called when the counter has a total target.
    fn render_progress(&mut self, slot: CounterSlot, progress: Progress, text: &str);

    /// Mark `highlight.active` as selected and the other two controls as not.
    fn highlight_adjustment(&mut self, slot: CounterSlot, highlight: AdjustmentHighlight);
}

/// Render the counter value and, when defined, its progress.
pub fn render_value<G>(counter: &Counter, slot: CounterSlot, format: &CounterFormat, gateway: &mut G)
where
    G: PresentationGateway + ?Sized,
{
    gateway.render_counter(slot, &format.format_counter(counter.value()));
    if let Some(progress) = counter.progress() {
        gateway.render_progress(slot, progress, &format.format_progress(progress.percent));
    }
}

/// Render the adjustment highlight for the counter's current step.
pub fn render_adjustment<G>(counter: &Counter, slot: CounterSlot, gateway: &mut G)
where
    G: PresentationGateway + ?Sized,
{
    gateway.highlight_adjustment(slot, AdjustmentHighlight::for_step(counter.step()));
}

/// Render every part of the counter.
pub fn render<G>(counter: &Counter, slot: CounterSlot, format: &CounterFormat, gateway: &mut G)
where
    G: PresentationGateway + ?Sized,
{
    render_value(counter, slot, format, gateway);
    render_adjustment(counter, slot, gateway);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        counter: Vec<String>,
        progress: Vec<String>,
        highlights: Vec<AdjustmentHighlight>,
    }

    impl PresentationGateway for Recorder {
        fn render_counter(&mut self, _slot: CounterSlot, text: &str) {
            self.counter.push(text.to_owned());
        }

        fn render_progress(&mut self, _slot: CounterSlot, _progress: Progress, text: &str) {
            self.progress.push(text.to_owned());
        }

        fn highlight_adjustment(&mut self, _slot: CounterSlot, highlight: AdjustmentHighlight) {
            self.highlights.push(highlight);
        }
    }

    #[test]
    fn exactly_one_control_is_active() {
        for step in Adjustment::ALL {
            let highlight = AdjustmentHighlight::for_step(step);
            let active: Vec<_> = Adjustment::ALL
                .into_iter()
                .filter(|control| highlight.is_active(*control))
                .collect();
            assert_eq!(active, vec![step]);
            assert!(!highlight.inactive.contains(&step));
            assert_ne!(highlight.inactive[0], highlight.inactive[1]);
        }
    }

    #[test]
    fn templates_are_filled() -> anyhow::Result<()> {
        let format = CounterFormat::new("Rows: {value}", "{percent}% done")?;
        assert_eq!(format.format_counter(17), "Rows: 17");
        assert_eq!(format.format_progress(25), "25% done");
        Ok(())
    }

    #[test]
    fn templates_must_contain_placeholders() {
        assert!(matches!(
            CounterFormat::new("Rows", "{percent}%"),
            Err(CounterError::InvalidTemplate {
                placeholder: VALUE_PLACEHOLDER,
                ..
            })
        ));
        assert!(matches!(
            CounterFormat::new("{value}", "done"),
            Err(CounterError::InvalidTemplate {
                placeholder: PERCENT_PLACEHOLDER,
                ..
            })
        ));
    }

    #[test]
    fn progress_is_skipped_without_target() {
        let mut recorder = Recorder::default();
        let counter = Counter::named("hat");
        render(&counter, CounterSlot::Stitch, &CounterFormat::default(), &mut recorder);
        assert_eq!(recorder.counter, vec!["0"]);
        assert!(recorder.progress.is_empty());
        assert_eq!(
            recorder.highlights,
            vec![AdjustmentHighlight::for_step(Adjustment::One)]
        );
    }

    #[test]
    fn progress_is_rendered_with_target() {
        let mut recorder = Recorder::default();
        let mut counter = Counter::new();
        counter.set_total_target(4);
        counter.increment();
        render_value(&counter, CounterSlot::Row, &CounterFormat::default(), &mut recorder);
        assert_eq!(recorder.counter, vec!["1"]);
        assert_eq!(recorder.progress, vec!["25%"]);
        assert!(recorder.highlights.is_empty());
    }
}
