mod common;

use chrono::{Datelike, Utc};
use storefront_api::{
    domain::{payment::PaymentMethod, role::Role, status::OrderStatus},
    dto::orders::UpdateOrderStatusRequest,
    error::AppError,
    services::{dashboard_service, order_service},
};

use common::{create_product, create_user, order_request, setup_state};

#[tokio::test]
async fn dashboard_counts_only_completed_orders() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let admin = create_user(&state, "admin@example.com", Role::Admin).await?;
    let customer = create_user(&state, "user@example.com", Role::User).await?;
    let product = create_product(&state, &admin, 50_000, 20).await?;

    let empty = dashboard_service::sum_total_sales(&state, &admin)
        .await?
        .data
        .expect("sales");
    assert_eq!(empty.total, 0);

    let delivered = order_service::create_order(
        &state,
        &customer,
        order_request(vec![(product.id, 3)], PaymentMethod::Cod, 165_000),
    )
    .await?
    .data
    .expect("order detail");
    for status in [
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ] {
        order_service::update_order_status(
            &state,
            &admin,
            delivered.order.id,
            UpdateOrderStatusRequest { status },
        )
        .await?;
    }

    // Still waiting for payment, must not be counted.
    order_service::create_order(
        &state,
        &customer,
        order_request(vec![(product.id, 1)], PaymentMethod::BankTransfer, 65_000),
    )
    .await?;

    let sales = dashboard_service::sum_total_sales(&state, &admin)
        .await?
        .data
        .expect("sales");
    assert_eq!(sales.total, 165_000);

    let quantity = dashboard_service::sum_total_orders(&state, &admin)
        .await?
        .data
        .expect("quantity");
    assert_eq!(quantity.quantity, 3);

    let users = dashboard_service::sum_total_users(&state, &admin)
        .await?
        .data
        .expect("users");
    assert_eq!(users.users, 2);

    let customers = dashboard_service::get_customers_recent_orders(&state, &admin)
        .await?
        .data
        .expect("customers");
    assert_eq!(customers.items.len(), 1);
    assert_eq!(customers.items[0].order_id, delivered.order.id);
    assert_eq!(customers.items[0].user.email, "user@example.com");

    let revenue = dashboard_service::get_monthly_revenue(&state, &admin)
        .await?
        .data
        .expect("revenue");
    assert_eq!(revenue.len(), 12);
    let month = Utc::now().month0() as usize;
    assert_eq!(revenue[month].total, 165_000);
    assert_eq!(revenue.iter().map(|m| m.total).sum::<i64>(), 165_000);

    let forbidden = dashboard_service::sum_total_sales(&state, &customer).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    Ok(())
}
