//! Ready and delivery dates for the generic calculator's turnaround option.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Turnaround;

/// Format used on the storefront, e.g. `Wed, Jan 15`.
pub const DISPLAY_FORMAT: &str = "%a, %b %-d";

/// Business days to the job being ready and to it arriving.
pub fn turnaround_days(turnaround: Turnaround) -> (u64, u64) {
    match turnaround {
        Turnaround::Rush => (1, 2),
        Turnaround::Fast => (3, 5),
        Turnaround::Standard => (7, 10),
        Turnaround::Economy => (14, 17),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub turnaround: Turnaround,
    pub ready_date: NaiveDate,
    pub delivery_date: NaiveDate,
}

impl DeliveryEstimate {
    /// Counts calendar days forward from `today`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use print_core::calculations::DeliveryEstimate;
    /// use print_core::models::Turnaround;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
    /// let estimate = DeliveryEstimate::from_date(Turnaround::Standard, today);
    ///
    /// assert_eq!(estimate.ready_display(), "Wed, Jan 15");
    /// ```
    pub fn from_date(
        turnaround: Turnaround,
        today: NaiveDate,
    ) -> Self {
        let (ready, delivery) = turnaround_days(turnaround);
        Self {
            turnaround,
            ready_date: add_days(today, ready),
            delivery_date: add_days(today, delivery),
        }
    }

    pub fn ready_display(&self) -> String {
        self.ready_date.format(DISPLAY_FORMAT).to_string()
    }

    pub fn delivery_display(&self) -> String {
        self.delivery_date.format(DISPLAY_FORMAT).to_string()
    }
}

// Saturates at NaiveDate::MAX rather than failing the whole quote.
fn add_days(
    date: NaiveDate,
    days: u64,
) -> NaiveDate {
    date.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn rush_is_ready_next_day() {
        let estimate = DeliveryEstimate::from_date(Turnaround::Rush, jan(8));

        assert_eq!(estimate.ready_date, jan(9));
        assert_eq!(estimate.delivery_date, jan(10));
    }

    #[test]
    fn economy_spans_weeks() {
        let estimate = DeliveryEstimate::from_date(Turnaround::Economy, jan(1));

        assert_eq!(estimate.ready_date, jan(15));
        assert_eq!(estimate.delivery_date, jan(18));
    }

    #[test]
    fn display_uses_short_weekday_and_month() {
        let estimate = DeliveryEstimate::from_date(Turnaround::Fast, jan(8));

        assert_eq!(estimate.ready_display(), "Sat, Jan 11");
        assert_eq!(estimate.delivery_display(), "Mon, Jan 13");
    }

    #[test]
    fn every_turnaround_delivers_after_ready() {
        for turnaround in Turnaround::ALL {
            let (ready, delivery) = turnaround_days(*turnaround);
            assert!(ready < delivery, "{turnaround}");
        }
    }
}
