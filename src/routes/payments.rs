use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::payments::{ConfirmPaymentRequest, PaymentReference},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Payment,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/confirm", post(confirm_payment))
        .route("/order/{order_id}", get(get_payment_by_order))
        .route("/reference/{transaction_id}", get(get_payment_by_reference))
}

#[utoipa::path(
    post,
    path = "/api/payments/confirm",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment completed, order is processing", body = ApiResponse<Payment>),
        (status = 400, description = "Amount mismatch or cash on delivery order"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Payment already confirmed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::confirm(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/order/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Payment of an order", body = ApiResponse<Payment>),
        (status = 404, description = "Order or payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment_by_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_by_order_id(&state, &user, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/reference/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Bank transaction reference")
    ),
    responses(
        (status = 200, description = "Payment by reference", body = ApiResponse<PaymentReference>),
        (status = 404, description = "No payment with this reference")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment_by_reference(
    State(state): State<AppState>,
    user: AuthUser,
    Path(transaction_id): Path<String>,
) -> AppResult<Json<ApiResponse<PaymentReference>>> {
    let resp = payment_service::get_by_reference_number(&state, &user, &transaction_id).await?;
    Ok(Json(resp))
}
