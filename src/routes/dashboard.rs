use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::{CustomerOrderList, MonthlyRevenue, TotalQuantity, TotalSales, TotalUsers},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(total_sales))
        .route("/orders", get(total_orders))
        .route("/users", get(total_users))
        .route("/customers", get(recent_customers))
        .route("/revenue", get(monthly_revenue))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/sales",
    responses(
        (status = 200, description = "Revenue of completed orders", body = ApiResponse<TotalSales>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn total_sales(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TotalSales>>> {
    let resp = dashboard_service::sum_total_sales(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/orders",
    responses(
        (status = 200, description = "Units sold in completed orders", body = ApiResponse<TotalQuantity>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn total_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TotalQuantity>>> {
    let resp = dashboard_service::sum_total_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/users",
    responses(
        (status = 200, description = "Registered users", body = ApiResponse<TotalUsers>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn total_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TotalUsers>>> {
    let resp = dashboard_service::sum_total_users(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/customers",
    responses(
        (status = 200, description = "Completed orders with their customers", body = ApiResponse<CustomerOrderList>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn recent_customers(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CustomerOrderList>>> {
    let resp = dashboard_service::get_customers_recent_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/revenue",
    responses(
        (status = 200, description = "Revenue per calendar month", body = ApiResponse<Vec<MonthlyRevenue>>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn monthly_revenue(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<MonthlyRevenue>>>> {
    let resp = dashboard_service::get_monthly_revenue(&state, &user).await?;
    Ok(Json(resp))
}
