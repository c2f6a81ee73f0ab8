use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::status::OrderStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalSales {
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalQuantity {
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalUsers {
    pub users: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerOrder {
    pub order_id: Uuid,
    pub receipt: String,
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub user: CustomerSummary,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CustomerOrderList {
    #[schema(value_type = Vec<CustomerOrder>)]
    pub items: Vec<CustomerOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyRevenue {
    pub name: String,
    pub total: i64,
}
