use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    domain::{
        payment::{Bank, PaymentMethod},
        shipping::ShippingMethod,
        status::OrderStatus,
    },
    models::{Order, OrderProduct, Payment},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Checkout payload. Shipping fields are copied onto the order so later
/// address edits do not rewrite history.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 1))]
    pub province: String,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub bank: Option<Bank>,
    pub account_number: Option<String>,
    pub notes: Option<String>,
    /// Total the client displayed; must match the server computation.
    pub total: i64,
    #[validate(
        length(min = 1, message = "order must contain at least one product"),
        nested,
        custom(function = "distinct_products")
    )]
    pub products: Vec<OrderLineInput>,
}

fn distinct_products(lines: &[OrderLineInput]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    if lines.iter().all(|line| seen.insert(line.product_id)) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_product"))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateOrderImageRequest {
    #[validate(url)]
    pub image: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderProduct>,
    pub payment: Option<Payment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(products: Vec<OrderLineInput>) -> CreateOrderRequest {
        CreateOrderRequest {
            name: "Budi".into(),
            phone: "08123456789".into(),
            email: "budi@example.com".into(),
            address: "Jl. Merdeka 1".into(),
            city: "Bandung".into(),
            postal_code: "40111".into(),
            province: "Jawa Barat".into(),
            shipping_method: ShippingMethod::Jne,
            payment_method: PaymentMethod::BankTransfer,
            bank: Some(Bank::Bri),
            account_number: None,
            notes: None,
            total: 215_000,
            products,
        }
    }

    #[test]
    fn rejects_empty_and_duplicate_lines() {
        assert!(request(vec![]).validate().is_err());

        let id = Uuid::new_v4();
        let dup = vec![
            OrderLineInput { product_id: id, quantity: 1 },
            OrderLineInput { product_id: id, quantity: 2 },
        ];
        assert!(request(dup).validate().is_err());
    }

    #[test]
    fn rejects_zero_quantity() {
        let lines = vec![OrderLineInput {
            product_id: Uuid::new_v4(),
            quantity: 0,
        }];
        assert!(request(lines).validate().is_err());
    }

    #[test]
    fn accepts_well_formed_checkout() {
        let lines = vec![OrderLineInput {
            product_id: Uuid::new_v4(),
            quantity: 2,
        }];
        assert!(request(lines).validate().is_ok());
    }

    #[test]
    fn status_request_uses_wire_names() {
        let req: UpdateOrderStatusRequest =
            serde_json::from_str(r#"{"status":"RETURN_REQUEST"}"#).unwrap();
        assert_eq!(req.status, OrderStatus::ReturnRequest);
    }
}
