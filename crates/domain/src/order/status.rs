//! Order status state machine.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The status of an order in its lifecycle.
///
/// Stored and transported as its numeric code.
///
/// State transitions:
/// ```text
/// Pending(1) ──► Placed(2) ──► Shipped(3) ──► Delivered(4)
///     │              │             │
///     └──────────────┴─────────────┴──► Cancelled(5)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum OrderStatus {
    /// Open cart; items can be added, changed and removed.
    #[default]
    Pending,

    /// Checked out, awaiting shipment.
    Placed,

    /// Handed to the carrier.
    Shipped,

    /// Received by the customer (terminal state).
    Delivered,

    /// Cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns the numeric status code.
    pub fn code(&self) -> i64 {
        match self {
            OrderStatus::Pending => 1,
            OrderStatus::Placed => 2,
            OrderStatus::Shipped => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => 5,
        }
    }

    /// Parses a numeric status code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(OrderStatus::Pending),
            2 => Some(OrderStatus::Placed),
            3 => Some(OrderStatus::Shipped),
            4 => Some(OrderStatus::Delivered),
            5 => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Returns true if cart items can be modified in this status.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if delivery details can still be edited.
    pub fn can_edit_delivery(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Placed)
    }

    /// Returns true if the order may move from this status to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Placed)
                | (OrderStatus::Placed, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (
                    OrderStatus::Pending | OrderStatus::Placed | OrderStatus::Shipped,
                    OrderStatus::Cancelled
                )
        )
    }

    /// Returns the status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Placed => "Placed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i64> for OrderStatus {
    type Error = OrderError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(OrderError::InvalidStatus { code })
    }
}

impl From<OrderStatus> for i64 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Placed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn codes_round_trip() {
        for status in ALL {
            assert_eq!(OrderStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(OrderStatus::from_code(0), None);
        assert_eq!(OrderStatus::from_code(6), None);
    }

    #[test]
    fn forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Placed));
        assert!(OrderStatus::Placed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Placed.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Placed));
        assert!(!OrderStatus::Placed.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn cancel_from_non_terminal_states() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Placed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn terminal_states_go_nowhere() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn only_carts_modify_items() {
        assert!(OrderStatus::Pending.can_modify_items());
        assert!(ALL[1..].iter().all(|s| !s.can_modify_items()));
    }

    #[test]
    fn delivery_edits_until_shipped() {
        assert!(OrderStatus::Pending.can_edit_delivery());
        assert!(OrderStatus::Placed.can_edit_delivery());
        assert!(!OrderStatus::Shipped.can_edit_delivery());
        assert!(!OrderStatus::Delivered.can_edit_delivery());
        assert!(!OrderStatus::Cancelled.can_edit_delivery());
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&OrderStatus::Shipped).unwrap(), "3");
        let status: OrderStatus = serde_json::from_str("4").unwrap();
        assert_eq!(status, OrderStatus::Delivered);
        assert!(serde_json::from_str::<OrderStatus>("9").is_err());
    }
}
