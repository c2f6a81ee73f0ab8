//! Order lifecycle.
//!
//! ```text
//! PENDING -> PROCESSING -> PACKED -> SHIPPED -> DELIVERED -> COMPLETED
//!    \___________\____________\---> CANCELLED
//!                                   DELIVERED -> RETURN_REQUEST -> RETURNED -> REFUNDED
//!                                                RETURN_REQUEST ------------> REFUNDED
//! ```
//!
//! Every status change goes through [`OrderStatus::transition`]; the table in
//! [`OrderStatus::predecessors`] is the only place legal moves are defined.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{payment::PaymentMethod, role::Role};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Packed,
    Shipped,
    Delivered,
    ReturnRequest,
    Returned,
    Completed,
    Cancelled,
    Refunded,
}

string_enum!(OrderStatus, "order status", {
    Pending => "PENDING",
    Processing => "PROCESSING",
    Packed => "PACKED",
    Shipped => "SHIPPED",
    Delivered => "DELIVERED",
    ReturnRequest => "RETURN_REQUEST",
    Returned => "RETURNED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
    Refunded => "REFUNDED",
});

impl OrderStatus {
    /// Status a freshly created order starts in. Cash on delivery needs no
    /// payment confirmation, so it goes straight to processing.
    pub fn initial_for(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cod => OrderStatus::Processing,
            PaymentMethod::BankTransfer => OrderStatus::Pending,
        }
    }

    /// States an order may be in right before entering `self`.
    pub fn predecessors(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[],
            Processing => &[Pending],
            Packed => &[Processing],
            Shipped => &[Packed],
            Delivered => &[Shipped],
            Completed => &[Delivered],
            Cancelled => &[Pending, Processing, Packed],
            ReturnRequest => &[Delivered],
            Returned => &[ReturnRequest],
            Refunded => &[ReturnRequest, Returned],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        next.predecessors().contains(self)
    }

    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        OrderStatus::ALL
            .iter()
            .all(|next| !self.can_transition_to(*next))
    }

    /// Whether entering this status hands the purchased units back to stock.
    pub fn restocks(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    /// Target statuses a role may request. Customers are further limited to
    /// their own orders by the caller.
    pub fn settable_by(&self, role: Role) -> bool {
        use OrderStatus::*;
        match role {
            Role::Admin => true,
            Role::Courier => matches!(self, Shipped | Delivered | Completed),
            Role::User => matches!(self, Completed | ReturnRequest),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order is waiting for payment.",
            OrderStatus::Processing => "Order is being processed.",
            OrderStatus::Packed => "Order is being packed.",
            OrderStatus::Shipped => "Order is on its way.",
            OrderStatus::Delivered => "Order is out for delivery.",
            OrderStatus::Completed => "Order arrived and was received by the recipient.",
            OrderStatus::Cancelled => "Order has been cancelled.",
            OrderStatus::ReturnRequest => "Return request is being processed.",
            OrderStatus::Returned => "Order has been returned.",
            OrderStatus::Refunded => "Refund for the order has been completed.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn happy_path_is_linear() {
        let mut status = OrderStatus::Pending;
        for next in [
            OrderStatus::Processing,
            OrderStatus::Packed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Completed,
        ] {
            status = status.transition(next).expect("legal transition");
        }
        assert_eq!(status, OrderStatus::Completed);
    }

    #[test]
    fn completed_order_cannot_go_back_to_pending() {
        let err = OrderStatus::Completed
            .transition(OrderStatus::Pending)
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Pending
            }
        ));
    }

    #[test]
    fn cancel_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Packed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn returns_branch_from_delivered() {
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::ReturnRequest));
        assert!(OrderStatus::ReturnRequest.can_transition_to(OrderStatus::Returned));
        assert!(OrderStatus::ReturnRequest.can_transition_to(OrderStatus::Refunded));
        assert!(OrderStatus::Returned.can_transition_to(OrderStatus::Refunded));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::ReturnRequest));
    }

    #[test]
    fn no_state_transitions_to_itself() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(*status), "{status} loops");
        }
    }

    #[test]
    fn terminal_states() {
        let terminal: Vec<_> = OrderStatus::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .copied()
            .collect();
        assert_eq!(
            terminal,
            vec![
                OrderStatus::Completed,
                OrderStatus::Cancelled,
                OrderStatus::Refunded
            ]
        );
    }

    #[test]
    fn initial_status_depends_on_payment_method() {
        assert_eq!(
            OrderStatus::initial_for(PaymentMethod::Cod),
            OrderStatus::Processing
        );
        assert_eq!(
            OrderStatus::initial_for(PaymentMethod::BankTransfer),
            OrderStatus::Pending
        );
    }

    #[test]
    fn role_permissions() {
        assert!(OrderStatus::Refunded.settable_by(Role::Admin));
        assert!(OrderStatus::Delivered.settable_by(Role::Courier));
        assert!(!OrderStatus::Packed.settable_by(Role::Courier));
        assert!(OrderStatus::ReturnRequest.settable_by(Role::User));
        assert!(!OrderStatus::Processing.settable_by(Role::User));
    }

    #[test]
    fn string_form_round_trips_through_column_values() {
        assert_eq!(OrderStatus::ReturnRequest.as_str(), "RETURN_REQUEST");
        assert_eq!(
            OrderStatus::from_str("RETURN_REQUEST").unwrap(),
            OrderStatus::ReturnRequest
        );
        assert!(OrderStatus::from_str("paid").is_err());
        let json = serde_json::to_string(&OrderStatus::ReturnRequest).unwrap();
        assert_eq!(json, "\"RETURN_REQUEST\"");
    }
}
