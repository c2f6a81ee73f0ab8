use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{
        payment::PaymentStatus,
        receipt::generate_receipt,
        shipping::{LinePrice, order_total},
        status::OrderStatus,
    },
    dto::orders::{
        CreateOrderRequest, OrderDetail, OrderList, UpdateOrderImageRequest,
        UpdateOrderStatusRequest,
    },
    entity::{
        order_products::{
            ActiveModel as OrderProductActive, Column as OrderProductCol,
            Entity as OrderProducts,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders,
            Model as OrderModel,
        },
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff},
    models::{Order, order_from_entity, order_product_from_entity, payment_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::product_service::with_images,
    state::AppState,
};

const RECEIPT_ATTEMPTS: usize = 5;

/// Expand orders with their snapshot lines (product + images) and payment.
pub(crate) async fn load_details<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderDetail>> {
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }

    let lines = OrderProducts::find()
        .filter(OrderProductCol::OrderId.is_in(order_ids.clone()))
        .all(conn)
        .await?;

    let mut product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    product_ids.sort();
    product_ids.dedup();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?;
    let products: HashMap<Uuid, _> = with_images(conn, products)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut lines_by_order: HashMap<Uuid, Vec<_>> = HashMap::new();
    for line in lines {
        let product = products.get(&line.product_id).cloned();
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(order_product_from_entity(line, product));
    }

    let mut payments: HashMap<Uuid, _> = Payments::find()
        .filter(PaymentCol::OrderId.is_in(order_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.order_id, p))
        .collect();

    orders
        .into_iter()
        .map(|order| {
            let items = lines_by_order.remove(&order.id).unwrap_or_default();
            let payment = payments
                .remove(&order.id)
                .map(payment_from_entity)
                .transpose()?;
            Ok(OrderDetail {
                order: order_from_entity(order)?,
                items,
                payment,
            })
        })
        .collect()
}

/// Insert `order` under the first receipt from `receipts` that is free.
///
/// Every attempt runs in a savepoint, so losing a receipt race to a
/// concurrent checkout rolls back only that insert and the caller's
/// transaction stays usable.
pub async fn insert_with_receipt<C, I>(
    conn: &C,
    order: OrderActive,
    receipts: I,
) -> AppResult<OrderModel>
where
    C: TransactionTrait,
    I: IntoIterator<Item = String>,
{
    for receipt in receipts {
        let mut candidate = order.clone();
        candidate.receipt = Set(receipt.clone());

        let savepoint = conn.begin().await?;
        match candidate.insert(&savepoint).await {
            Ok(model) => {
                savepoint.commit().await?;
                return Ok(model);
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                savepoint.rollback().await?;
                tracing::warn!(%receipt, "receipt collision, regenerating");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique receipt"
    )))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    payload.validate()?;
    payload
        .payment_method
        .check_bank(payload.bank)
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;

    let txn = state.orm.begin().await?;

    let product_ids: Vec<Uuid> = payload.products.iter().map(|l| l.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut lines = Vec::with_capacity(payload.products.len());
    for line in &payload.products {
        let product = products.get(&line.product_id).ok_or(AppError::NotFound)?;
        if product.stock < line.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.id
            )));
        }
        lines.push(LinePrice {
            unit_price: product.price,
            quantity: line.quantity,
        });
    }

    let total = order_total(&lines, payload.shipping_method)
        .ok_or_else(|| AppError::BadRequest("order total is too large".into()))?;
    if total != payload.total {
        return Err(AppError::BadRequest(format!(
            "Order total mismatch: expected {total}, received {}",
            payload.total
        )));
    }

    let status = OrderStatus::initial_for(payload.payment_method);

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(payload.name),
        phone: Set(payload.phone),
        email: Set(payload.email),
        address: Set(payload.address),
        city: Set(payload.city),
        postal_code: Set(payload.postal_code),
        province: Set(payload.province),
        shipping_method: Set(payload.shipping_method.to_string()),
        shipping_cost: Set(payload.shipping_method.cost()),
        notes: Set(payload.notes),
        receipt: NotSet,
        status: Set(status.to_string()),
        image: Set(None),
        total: Set(total),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let prefix = state.config.receipt_prefix.as_str();
    let receipts = std::iter::repeat_with(|| generate_receipt(prefix)).take(RECEIPT_ATTEMPTS);
    let order = insert_with_receipt(&txn, order, receipts).await?;

    for (line, priced) in payload.products.iter().zip(&lines) {
        OrderProductActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(priced.unit_price),
        }
        .insert(&txn)
        .await?;

        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(line.quantity))
            .filter(ProdCol::Id.eq(line.product_id))
            .exec(&txn)
            .await?;
    }

    PaymentActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        payment_method: Set(payload.payment_method.to_string()),
        bank: Set(payload.bank.map(|b| b.to_string())),
        account_number: Set(payload.account_number),
        amount: Set(total),
        transaction_id: Set(None),
        status: Set(PaymentStatus::Pending.to_string()),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let detail = load_details(&txn, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;

    txn.commit().await?;

    tracing::info!(
        order_id = %detail.order.id,
        receipt = %detail.order.receipt,
        status = %detail.order.status,
        total,
        "order created"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": detail.order.id, "receipt": detail.order.receipt }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        detail,
        Some(Meta::empty()),
    ))
}

async fn list_orders(
    state: &AppState,
    condition: Condition,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = condition;
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder: Select<Orders> = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = load_details(&state.orm, orders).await?;

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Every order in the store (admin).
pub async fn get_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    list_orders(state, Condition::all(), query).await
}

/// Orders placed by the caller.
pub async fn get_order_user_id(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    list_orders(
        state,
        Condition::all().add(OrderCol::UserId.eq(user.user_id)),
        query,
    )
    .await
}

pub async fn get_order_by_id(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|o| user.can_view(o.user_id))
        .ok_or(AppError::NotFound)?;
    let detail = load_details(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(detail))
}

/// Courier lookup by receipt code.
pub async fn get_order_receipt(
    state: &AppState,
    user: &AuthUser,
    receipt: &str,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_staff(user)?;
    let order = Orders::find()
        .filter(OrderCol::Receipt.eq(receipt))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let detail = load_details(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(detail))
}

/// Move an order to `payload.status`.
///
/// The caller's role must be allowed to request the target status, customers
/// may only touch their own orders, and the move must be legal from the
/// current status. Cancelling or receiving a return puts the purchased units
/// back into stock.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let target = payload.status;
    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .filter(|o| user.can_view(o.user_id))
        .ok_or(AppError::NotFound)?;

    if !target.settable_by(user.role) {
        return Err(AppError::Forbidden);
    }

    let current: OrderStatus = existing.status.parse()?;
    current.transition(target)?;

    // PENDING -> PROCESSING belongs to payment confirmation.
    if current == OrderStatus::Pending && target == OrderStatus::Processing {
        let paid = Payments::find()
            .filter(PaymentCol::OrderId.eq(existing.id))
            .one(&txn)
            .await?
            .map(|p| p.status.parse::<PaymentStatus>())
            .transpose()?
            == Some(PaymentStatus::Completed);
        if !paid {
            return Err(AppError::BadRequest(
                "order is awaiting payment confirmation".to_string(),
            ));
        }
    }

    if target.restocks() {
        let lines = OrderProducts::find()
            .filter(OrderProductCol::OrderId.eq(existing.id))
            .order_by_asc(OrderProductCol::ProductId)
            .all(&txn)
            .await?;
        for line in lines {
            Products::update_many()
                .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(line.quantity))
                .filter(ProdCol::Id.eq(line.product_id))
                .exec(&txn)
                .await?;
        }
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(target.to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = %current, to = %target, "order status changed");
    audit::record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": current, "to": target }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// Attach the courier's proof-of-delivery image.
pub async fn update_image_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderImageRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    payload.validate()?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let status: OrderStatus = existing.status.parse()?;
    if status != OrderStatus::Delivered {
        return Err(AppError::BadRequest(format!(
            "Delivery proof can only be attached to DELIVERED orders, order is {status}"
        )));
    }

    let mut active: OrderActive = existing.into();
    active.image = Set(Some(payload.image));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_image_update",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "success": true }),
        Some(Meta::empty()),
    ))
}
