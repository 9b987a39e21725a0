//! Digital tool entitlements.
//!
//! Buying a digital tool grants access for a fixed number of days from the
//! order's placement time. Elapsed time is counted in whole UTC days,
//! rounded down, so access never expires mid-day earlier than the buyer
//! expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, ProductId};

/// Validity granted per purchase when the catalog does not say otherwise.
pub const DEFAULT_VALIDITY_DAYS: u32 = 30;

/// Access to one digital tool, granted by one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub product_id: ProductId,
    pub order_id: OrderId,
    /// When the granting order was placed.
    pub granted_at: DateTime<Utc>,
    /// Total access period, in days.
    pub validity_days: u32,
}

impl Entitlement {
    /// Whole days elapsed since the grant, never negative.
    ///
    /// Clock skew can put `granted_at` in the future; that counts as zero
    /// elapsed days rather than extending the validity.
    #[must_use]
    pub fn days_elapsed(&self, now: DateTime<Utc>) -> i64 {
        (now - self.granted_at).num_days().max(0)
    }

    /// Days of access left, floored at zero.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> u32 {
        let left = i64::from(self.validity_days) - self.days_elapsed(now);
        u32::try_from(left).unwrap_or(0)
    }

    /// An entitlement is expired exactly when no days remain.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.days_remaining(now) == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn granted() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn entitlement() -> Entitlement {
        Entitlement {
            product_id: ProductId::new("t1"),
            order_id: OrderId::new("o1"),
            granted_at: granted(),
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    #[test]
    fn test_day_zero_has_full_validity() {
        let e = entitlement();
        assert_eq!(e.days_remaining(granted()), 30);
        assert!(!e.is_expired(granted()));
    }

    #[test]
    fn test_partial_day_rounds_down() {
        let e = entitlement();
        let now = granted() + Duration::hours(23);
        assert_eq!(e.days_elapsed(now), 0);
        assert_eq!(e.days_remaining(now), 30);
    }

    #[test]
    fn test_expires_exactly_at_validity() {
        let e = entitlement();
        let now = granted() + Duration::days(30);
        assert_eq!(e.days_remaining(now), 0);
        assert!(e.is_expired(now));
    }

    #[test]
    fn test_stays_expired_after_validity() {
        let e = entitlement();
        let now = granted() + Duration::days(45);
        assert_eq!(e.days_remaining(now), 0);
        assert!(e.is_expired(now));
    }

    #[test]
    fn test_future_grant_counts_as_day_zero() {
        let e = entitlement();
        let now = granted() - Duration::days(2);
        assert_eq!(e.days_elapsed(now), 0);
        assert_eq!(e.days_remaining(now), 30);
    }

    #[test]
    fn test_remaining_is_monotone_non_increasing() {
        let e = entitlement();
        let mut previous = u32::MAX;
        for day in 0..=35 {
            let now = granted() + Duration::days(day);
            let remaining = e.days_remaining(now);
            assert!(remaining <= previous);
            previous = remaining;
        }
    }
}
