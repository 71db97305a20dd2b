//! Terminal presentation of a counter screen.

use std::fmt;

use stitch_counter_core::{
    Adjustment, AdjustmentHighlight, CounterSlot, PresentationGateway, Progress,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct SlotView {
    counter: String,
    progress: Option<String>,
    highlight: Option<AdjustmentHighlight>,
}

impl SlotView {
    fn controls(&self) -> String {
        Adjustment::ALL
            .iter()
            .map(|&control| match self.highlight {
                Some(highlight) if highlight.is_active(control) => format!("[{}]", control.label()),
                _ => control.label().to_owned(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Collects the latest rendering of each counter and prints it as a frame.
#[derive(Debug, Default)]
pub struct TerminalView {
    title: String,
    stitch: SlotView,
    row: Option<SlotView>,
}

impl TerminalView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    fn slot_mut(&mut self, slot: CounterSlot) -> &mut SlotView {
        match slot {
            CounterSlot::Stitch => &mut self.stitch,
            CounterSlot::Row => self.row.get_or_insert_with(SlotView::default),
        }
    }
}

impl PresentationGateway for TerminalView {
    fn render_counter(&mut self, slot: CounterSlot, text: &str) {
        let view = self.slot_mut(slot);
        text.clone_into(&mut view.counter);
        // Progress is re-rendered after the value whenever it is defined.
        view.progress = None;
    }

    fn render_progress(&mut self, slot: CounterSlot, _progress: Progress, text: &str) {
        self.slot_mut(slot).progress = Some(text.to_owned());
    }

    fn highlight_adjustment(&mut self, slot: CounterSlot, highlight: AdjustmentHighlight) {
        self.slot_mut(slot).highlight = Some(highlight);
    }
}

impl fmt::Display for TerminalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let rows = [(CounterSlot::Stitch, Some(&self.stitch)), (CounterSlot::Row, self.row.as_ref())];
        for (slot, view) in rows {
            let Some(view) = view else {
                continue;
            };
            write!(f, "  {:<8}{:>8}", slot.as_str(), view.counter)?;
            if let Some(progress) = &view.progress {
                write!(f, "  {progress}")?;
            }
            writeln!(f, "  {}", view.controls())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_counter_core::{Counter, CounterFormat, render};

    #[test]
    fn frame_shows_value_progress_and_active_step() -> anyhow::Result<()> {
        let mut row = Counter::named("Raglan");
        row.set_total_target(120);
        row.set_adjustment_step(10)?;
        for _ in 0..3 {
            row.increment();
        }
        let stitch = Counter::named("Raglan");

        let mut view = TerminalView::new("#1 Raglan");
        let format = CounterFormat::default();
        render(&stitch, CounterSlot::Stitch, &format, &mut view);
        render(&row, CounterSlot::Row, &format, &mut view);

        let frame = view.to_string();
        let lines: Vec<_> = frame.lines().collect();
        assert_eq!(lines[0], "#1 Raglan");
        assert!(lines[1].contains("stitch"));
        assert!(lines[1].ends_with("[+1] +5 +10"));
        assert!(!lines[1].contains('%'));
        assert!(lines[2].contains("30  25%"));
        assert!(lines[2].ends_with("+1 +5 [+10]"));
        Ok(())
    }

    #[test]
    fn cleared_target_drops_progress() {
        let mut counter = Counter::named("Hat");
        counter.set_total_target(10);
        counter.increment();

        let mut view = TerminalView::new("Hat");
        let format = CounterFormat::default();
        render(&counter, CounterSlot::Stitch, &format, &mut view);
        assert!(view.to_string().contains("10%"));

        counter.set_total_target(0);
        render(&counter, CounterSlot::Stitch, &format, &mut view);
        assert!(!view.to_string().contains('%'));
    }

    #[test]
    fn single_counter_frame_has_no_row_line() {
        let mut view = TerminalView::new("Socks");
        render(
            &Counter::named("Socks"),
            CounterSlot::Stitch,
            &CounterFormat::default(),
            &mut view,
        );
        assert_eq!(view.to_string().lines().count(), 2);
    }
}
