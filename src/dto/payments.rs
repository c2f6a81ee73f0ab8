use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::payment::PaymentStatus;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConfirmPaymentRequest {
    pub order_id: Uuid,
    #[validate(length(min = 1))]
    pub transaction_id: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentReference {
    pub order_id: Uuid,
    pub amount: i64,
    pub status: PaymentStatus,
}
