//! Order progress timeline.
//!
//! Maps an order's stored status onto the four-step tracker the order
//! tracking screen renders. The data service only stores `Pending`,
//! `Shipped`, `Delivered` and `Cancelled`; the "confirmed" step is implied
//! by `Pending`, which is why a pending order already shows its second
//! step active.

use chrono::{DateTime, Duration, Utc};

use crate::types::OrderStatus;

/// Days after placement that the delivery estimate is set to.
pub const DELIVERY_ESTIMATE_DAYS: i64 = 3;

/// Bengali titles for the four tracker steps.
pub const STEP_TITLES_BN: [&str; 4] = [
    "অর্ডার করা হয়েছে",
    "নিশ্চিত করা হয়েছে",
    "পাঠানো হয়েছে",
    "পৌঁছেছে",
];

/// Render state of a single tracker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Completed, shown filled.
    Done,
    /// The step the order is currently on, shown highlighted.
    Active,
    /// Not reached yet, shown dimmed.
    Upcoming,
    /// Replaces the current step when the order was cancelled.
    Cancelled,
}

/// One step of the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStep {
    pub title: &'static str,
    pub state: StepState,
    /// Known or estimated timestamp for the step, when there is one.
    pub timestamp: Option<DateTime<Utc>>,
}

/// The full tracker for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTimeline {
    pub steps: Vec<TimelineStep>,
    /// Estimated delivery date. `None` once the order is terminal.
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Build the tracker for an order from its status and placement time.
#[must_use]
pub fn order_timeline(status: OrderStatus, created_at: DateTime<Utc>) -> OrderTimeline {
    let estimate = created_at + Duration::days(DELIVERY_ESTIMATE_DAYS);

    if status == OrderStatus::Cancelled {
        // Placement happened, then the order stopped. The cancel marker
        // takes the confirmation slot and the rest never happens.
        let steps = vec![
            TimelineStep {
                title: STEP_TITLES_BN[0],
                state: StepState::Done,
                timestamp: Some(created_at),
            },
            TimelineStep {
                title: "বাতিল করা হয়েছে",
                state: StepState::Cancelled,
                timestamp: None,
            },
            TimelineStep {
                title: STEP_TITLES_BN[2],
                state: StepState::Upcoming,
                timestamp: None,
            },
            TimelineStep {
                title: STEP_TITLES_BN[3],
                state: StepState::Upcoming,
                timestamp: None,
            },
        ];
        return OrderTimeline {
            steps,
            estimated_delivery: None,
        };
    }

    let current = match status {
        OrderStatus::Pending => 1,
        OrderStatus::Shipped => 2,
        OrderStatus::Delivered | OrderStatus::Cancelled => 3,
    };
    let delivered = status == OrderStatus::Delivered;

    let steps = STEP_TITLES_BN
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let state = if i < current || (delivered && i == current) {
                StepState::Done
            } else if i == current {
                StepState::Active
            } else {
                StepState::Upcoming
            };
            let timestamp = match i {
                0 => Some(created_at),
                3 => Some(estimate),
                _ => None,
            };
            TimelineStep {
                title,
                state,
                timestamp,
            }
        })
        .collect();

    OrderTimeline {
        steps,
        estimated_delivery: if delivered { None } else { Some(estimate) },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn placed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn states(timeline: &OrderTimeline) -> Vec<StepState> {
        timeline.steps.iter().map(|s| s.state).collect()
    }

    #[test]
    fn test_pending_shows_confirmation_active() {
        let timeline = order_timeline(OrderStatus::Pending, placed());
        assert_eq!(
            states(&timeline),
            vec![
                StepState::Done,
                StepState::Active,
                StepState::Upcoming,
                StepState::Upcoming,
            ]
        );
        assert_eq!(
            timeline.estimated_delivery,
            Some(placed() + Duration::days(3))
        );
    }

    #[test]
    fn test_shipped_marks_two_done() {
        let timeline = order_timeline(OrderStatus::Shipped, placed());
        assert_eq!(
            states(&timeline),
            vec![
                StepState::Done,
                StepState::Done,
                StepState::Active,
                StepState::Upcoming,
            ]
        );
    }

    #[test]
    fn test_delivered_marks_all_done() {
        let timeline = order_timeline(OrderStatus::Delivered, placed());
        assert_eq!(states(&timeline), vec![StepState::Done; 4]);
        assert_eq!(timeline.estimated_delivery, None);
    }

    #[test]
    fn test_cancelled_short_circuits() {
        let timeline = order_timeline(OrderStatus::Cancelled, placed());
        assert_eq!(
            states(&timeline),
            vec![
                StepState::Done,
                StepState::Cancelled,
                StepState::Upcoming,
                StepState::Upcoming,
            ]
        );
        assert_eq!(timeline.steps[1].title, "বাতিল করা হয়েছে");
        assert_eq!(timeline.estimated_delivery, None);
    }

    #[test]
    fn test_progress_is_monotone() {
        // Each forward status transition only turns steps "more done".
        fn rank(state: StepState) -> u8 {
            match state {
                StepState::Upcoming => 0,
                StepState::Active => 1,
                StepState::Done | StepState::Cancelled => 2,
            }
        }

        let sequence = [
            OrderStatus::Pending,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for pair in sequence.windows(2) {
            let before = order_timeline(pair[0], placed());
            let after = order_timeline(pair[1], placed());
            for (b, a) in before.steps.iter().zip(&after.steps) {
                assert!(rank(a.state) >= rank(b.state));
            }
        }
    }

    #[test]
    fn test_step_timestamps() {
        let timeline = order_timeline(OrderStatus::Pending, placed());
        assert_eq!(timeline.steps[0].timestamp, Some(placed()));
        assert_eq!(timeline.steps[1].timestamp, None);
        assert_eq!(timeline.steps[3].timestamp, Some(placed() + Duration::days(3)));
    }
}
