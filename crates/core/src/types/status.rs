//! Order status as stored by the external data service.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// The service stores the variant names verbatim (`"Pending"`, `"Shipped"`,
/// ...). The status is mutated only by the service; this client reads it.
/// `Pending` covers the implicit "confirmed" phase - there is no separate
/// confirmed status in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order can no longer progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Bengali display label, as shown on the order screens.
    #[must_use]
    pub const fn label_bn(self) -> &'static str {
        match self {
            Self::Pending => "প্রক্রিয়াধীন",
            Self::Shipped => "পথে আছে",
            Self::Delivered => "সম্পন্ন",
            Self::Cancelled => "বাতিল",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_stored_strings() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"Pending\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }
}
