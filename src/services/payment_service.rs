use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{
        payment::{PaymentMethod, PaymentStatus},
        status::OrderStatus,
    },
    dto::payments::{ConfirmPaymentRequest, PaymentReference},
    entity::{
        orders::{ActiveModel as OrderActive, Entity as Orders},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Payment, payment_from_entity},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Record a bank transfer against its order.
///
/// Succeeds once per order and only when `amount` equals the order total.
/// Payment and order move together: the payment becomes COMPLETED and the
/// order PROCESSING, or neither changes.
pub async fn confirm(
    state: &AppState,
    user: &AuthUser,
    payload: ConfirmPaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(payload.order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if order.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::NotFound);
    }

    let payment = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if payload.amount != order.total {
        tracing::warn!(
            order_id = %order.id,
            expected = order.total,
            received = payload.amount,
            "payment amount mismatch"
        );
        return Err(AppError::PaymentMismatch {
            expected: order.total,
            received: payload.amount,
        });
    }

    let method: PaymentMethod = payment.payment_method.parse()?;
    if method == PaymentMethod::Cod {
        return Err(AppError::BadRequest(
            "Cash on delivery orders are settled by the courier".into(),
        ));
    }

    let paid: PaymentStatus = payment.status.parse()?;
    if paid == PaymentStatus::Completed {
        return Err(AppError::Conflict("Payment already confirmed".into()));
    }

    let current: OrderStatus = order.status.parse()?;
    let next = current.transition(OrderStatus::Processing)?;

    let now = Utc::now();
    let mut active: PaymentActive = payment.into();
    active.status = Set(PaymentStatus::Completed.to_string());
    active.transaction_id = Set(Some(payload.transaction_id.clone()));
    active.amount = Set(payload.amount);
    active.paid_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let payment = active.update(&txn).await?;

    let mut order_active: OrderActive = order.into();
    order_active.status = Set(next.to_string());
    order_active.updated_at = Set(now.into());
    order_active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %payment.order_id,
        transaction_id = %payload.transaction_id,
        "payment confirmed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "payment_confirm",
        "payments",
        serde_json::json!({
            "order_id": payment.order_id,
            "transaction_id": payload.transaction_id,
            "amount": payload.amount,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment confirmed",
        payment_from_entity(payment)?,
        Some(Meta::empty()),
    ))
}

pub async fn get_by_order_id(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .filter(|o| user.can_view(o.user_id))
        .ok_or(AppError::NotFound)?;

    let payment = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::ok(payment_from_entity(payment)?))
}

/// Look a payment up by the bank's transaction reference.
pub async fn get_by_reference_number(
    state: &AppState,
    user: &AuthUser,
    transaction_id: &str,
) -> AppResult<ApiResponse<PaymentReference>> {
    let payment = Payments::find()
        .filter(PaymentCol::TransactionId.eq(transaction_id))
        .find_also_related(Orders)
        .one(&state.orm)
        .await?;

    let payment = match payment {
        Some((payment, Some(order))) if user.can_view(order.user_id) => payment,
        _ => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::ok(PaymentReference {
        order_id: payment.order_id,
        amount: payment.amount,
        status: payment.status.parse()?,
    }))
}
