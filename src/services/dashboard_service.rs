use chrono::{DateTime, Datelike, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    domain::status::OrderStatus,
    dto::dashboard::{
        CustomerOrder, CustomerOrderList, CustomerSummary, MonthlyRevenue, TotalQuantity,
        TotalSales, TotalUsers,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    state::AppState,
};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Revenue of completed orders, one row per distinct `created_at`.
#[derive(Debug, FromRow)]
pub struct RevenueRow {
    pub created_at: DateTime<Utc>,
    pub total: i64,
}

#[derive(FromRow)]
struct CustomerOrderRow {
    order_id: Uuid,
    receipt: String,
    total: i64,
    status: String,
    created_at: DateTime<Utc>,
    name: String,
    email: String,
    image: Option<String>,
}

/// Fold revenue rows into a fixed January..December series.
///
/// Only the calendar month is used, so orders from different years land in
/// the same bucket.
pub fn bucket_by_month(rows: &[RevenueRow]) -> Vec<MonthlyRevenue> {
    let mut totals = [0i64; 12];
    for row in rows {
        let idx = row.created_at.month0() as usize;
        totals[idx] = totals[idx].saturating_add(row.total);
    }
    MONTHS
        .iter()
        .zip(totals)
        .map(|(name, total)| MonthlyRevenue {
            name: (*name).to_string(),
            total,
        })
        .collect()
}

pub async fn sum_total_sales(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<TotalSales>> {
    ensure_admin(user)?;
    let (total,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total), 0)::BIGINT FROM orders WHERE status = $1",
    )
    .bind(OrderStatus::Completed.as_str())
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::ok(TotalSales { total }))
}

/// Units sold across completed orders.
pub async fn sum_total_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<TotalQuantity>> {
    ensure_admin(user)?;
    let (quantity,): (i64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(op.quantity), 0)::BIGINT
        FROM order_products op
        JOIN orders o ON o.id = op.order_id
        WHERE o.status = $1
        "#,
    )
    .bind(OrderStatus::Completed.as_str())
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::ok(TotalQuantity { quantity }))
}

pub async fn sum_total_users(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<TotalUsers>> {
    ensure_admin(user)?;
    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::ok(TotalUsers { users }))
}

pub async fn get_customers_recent_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CustomerOrderList>> {
    ensure_admin(user)?;
    let rows: Vec<CustomerOrderRow> = sqlx::query_as(
        r#"
        SELECT o.id AS order_id, o.receipt, o.total, o.status, o.created_at,
               u.name, u.email, u.image
        FROM orders o
        JOIN users u ON u.id = o.user_id
        WHERE o.status = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(OrderStatus::Completed.as_str())
    .fetch_all(&state.pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| {
            Ok(CustomerOrder {
                order_id: row.order_id,
                receipt: row.receipt,
                total: row.total,
                status: row.status.parse()?,
                created_at: row.created_at,
                user: CustomerSummary {
                    name: row.name,
                    email: row.email,
                    image: row.image,
                },
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::ok(CustomerOrderList { items }))
}

pub async fn get_monthly_revenue(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<MonthlyRevenue>>> {
    ensure_admin(user)?;
    let rows: Vec<RevenueRow> = sqlx::query_as(
        r#"
        SELECT created_at, SUM(total)::BIGINT AS total
        FROM orders
        WHERE status = $1
        GROUP BY created_at
        "#,
    )
    .bind(OrderStatus::Completed.as_str())
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok(bucket_by_month(&rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(y: i32, m: u32, d: u32, total: i64) -> RevenueRow {
        RevenueRow {
            created_at: Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
            total,
        }
    }

    #[test]
    fn empty_input_yields_twelve_zero_months() {
        let series = bucket_by_month(&[]);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].name, "Jan");
        assert_eq!(series[11].name, "Dec");
        assert!(series.iter().all(|m| m.total == 0));
    }

    #[test]
    fn sums_rows_by_calendar_month() {
        let rows = vec![
            row(2024, 3, 1, 100_000),
            row(2024, 3, 28, 50_000),
            row(2024, 12, 31, 7_000),
        ];
        let series = bucket_by_month(&rows);
        assert_eq!(series[2].total, 150_000);
        assert_eq!(series[11].total, 7_000);
        assert_eq!(series.iter().map(|m| m.total).sum::<i64>(), 157_000);
    }

    #[test]
    fn different_years_share_a_bucket() {
        let rows = vec![row(2023, 5, 10, 10), row(2024, 5, 10, 20)];
        assert_eq!(bucket_by_month(&rows)[4].total, 30);
    }
}
