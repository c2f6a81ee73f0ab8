use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCheckedRequest {
    pub checked: bool,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct CartItemIdsQuery {
    /// Comma separated cart item ids.
    pub ids: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartItemList {
    #[schema(value_type = Vec<CartItem>)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartCount {
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Success {
    pub success: bool,
}
