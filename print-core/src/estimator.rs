//! Per-widget estimator state.
//!
//! A [`PriceEstimator`] owns the raw selection of one widget and the last
//! breakdown that priced successfully. Input changes arrive as
//! [`SelectionEvent`]s and are applied by [`reduce`], which is pure. A failed
//! recalculation is logged and leaves the previous breakdown on display.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error};

use crate::calculations::PriceCalculator;
use crate::models::{OptionSelection, PriceBreakdown, Widget};
use crate::resolver::{self, RawSelection, slots};

/// Quantity bounds of the stepper buttons.
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A control changed value, or an option button became active.
    Select { slot: String, value: String },

    /// A control was removed or emptied.
    Clear { slot: String },

    /// The +/- quantity stepper.
    StepQuantity(i32),

    /// Back to the widget's defaults.
    Reset,
}

impl SelectionEvent {
    pub fn select(
        slot: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Select {
            slot: slot.into(),
            value: value.into(),
        }
    }
}

/// Applies one event to a widget's raw state.
pub fn reduce(
    widget: Widget,
    mut raw: RawSelection,
    event: SelectionEvent,
) -> RawSelection {
    match event {
        SelectionEvent::Select { slot, value } => {
            raw.set(slot, value);
            raw
        }
        SelectionEvent::Clear { slot } => {
            raw.clear(&slot);
            raw
        }
        SelectionEvent::StepQuantity(delta) => {
            let current = resolver::resolve(widget, &raw).quantity();
            let stepped = i64::from(current) + i64::from(delta);
            let clamped = stepped.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY));
            raw.set(slots::QUANTITY, clamped.to_string());
            raw
        }
        SelectionEvent::Reset => RawSelection::new(),
    }
}

pub struct PriceEstimator {
    widget: Widget,
    calculator: Arc<PriceCalculator>,
    raw: RawSelection,
    last_good: Option<PriceBreakdown>,
    recalculations: u64,
    failures: u64,
}

impl PriceEstimator {
    pub fn new(
        widget: Widget,
        calculator: Arc<PriceCalculator>,
    ) -> Self {
        Self {
            widget,
            calculator,
            raw: RawSelection::new(),
            last_good: None,
            recalculations: 0,
            failures: 0,
        }
    }

    /// Starts from existing raw state, e.g. CLI `--set` pairs.
    pub fn with_raw(
        widget: Widget,
        calculator: Arc<PriceCalculator>,
        raw: RawSelection,
    ) -> Self {
        Self {
            raw,
            ..Self::new(widget, calculator)
        }
    }

    pub fn widget(&self) -> Widget {
        self.widget
    }

    pub fn raw(&self) -> &RawSelection {
        &self.raw
    }

    /// The raw state resolved to a typed selection.
    pub fn selection(&self) -> OptionSelection {
        resolver::resolve(self.widget, &self.raw)
    }

    /// The last breakdown that priced successfully.
    pub fn breakdown(&self) -> Option<&PriceBreakdown> {
        self.last_good.as_ref()
    }

    pub fn recalculations(&self) -> u64 {
        self.recalculations
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn apply(
        &mut self,
        event: SelectionEvent,
    ) {
        debug!(widget = %self.widget, ?event, "Selection event");
        let raw = std::mem::take(&mut self.raw);
        self.raw = reduce(self.widget, raw, event);
    }

    /// Applies an event and reprices, as an input change does on the page.
    pub fn dispatch(
        &mut self,
        event: SelectionEvent,
    ) -> Option<&PriceBreakdown> {
        self.apply(event);
        self.recalculate()
    }

    pub fn recalculate(&mut self) -> Option<&PriceBreakdown> {
        let today = chrono::Local::now().date_naive();
        self.recalculate_on(today)
    }

    /// Reprices the current selection. On failure the error is logged and
    /// the previous breakdown is kept.
    pub fn recalculate_on(
        &mut self,
        today: NaiveDate,
    ) -> Option<&PriceBreakdown> {
        self.recalculations += 1;
        let selection = self.selection();

        match self.calculator.calculate_on(&selection, today) {
            Ok(breakdown) => {
                self.last_good = Some(breakdown);
            }
            Err(e) => {
                self.failures += 1;
                error!(
                    widget = %self.widget,
                    error = %e,
                    "Price calculation failed, keeping last estimate"
                );
            }
        }

        self.last_good.as_ref()
    }
}
