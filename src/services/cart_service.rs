use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartCount, CartItemList, Success, UpdateCartItemRequest},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as ItemCol, Entity as CartItems,
            Model as CartItemModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartItem},
    response::{ApiResponse, Meta},
    services::product_service::with_images,
    state::AppState,
};

async fn find_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Option<CartModel>> {
    Ok(Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// Carts are created lazily on the first add.
async fn find_or_create_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<CartModel> {
    if let Some(cart) = find_cart(conn, user_id).await? {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
    };
    Carts::insert(cart)
        .on_conflict(OnConflict::column(CartCol::UserId).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

    find_cart(conn, user_id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart missing after insert")))
}

async fn find_owned_item<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<CartItemModel> {
    let cart = find_cart(conn, user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    CartItems::find()
        .filter(
            Condition::all()
                .add(ItemCol::Id.eq(item_id))
                .add(ItemCol::CartId.eq(cart.id)),
        )
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Join cart rows with their products (and product images).
async fn with_products<C: ConnectionTrait>(
    conn: &C,
    items: Vec<CartItemModel>,
) -> AppResult<Vec<CartItem>> {
    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products = Products::find()
        .filter(crate::entity::products::Column::Id.is_in(product_ids))
        .all(conn)
        .await?;
    let mut products: std::collections::HashMap<Uuid, _> = with_images(conn, products)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    items
        .into_iter()
        .map(|item| {
            let product = products.remove(&item.product_id).ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("product {} missing", item.product_id))
            })?;
            Ok(CartItem {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                checked: item.checked,
                product,
                created_at: item.created_at.with_timezone(&Utc),
            })
        })
        .collect()
}

async fn load_cart(state: &AppState, user: &AuthUser, only_checked: bool) -> AppResult<Cart> {
    let Some(cart) = find_cart(&state.orm, user.user_id).await? else {
        return Ok(Cart {
            id: None,
            items: Vec::new(),
        });
    };

    let mut condition = Condition::all().add(ItemCol::CartId.eq(cart.id));
    if only_checked {
        condition = condition.add(ItemCol::Checked.eq(true));
    }
    let rows = CartItems::find()
        .filter(condition)
        .order_by_desc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?;

    Ok(Cart {
        id: Some(cart.id),
        items: with_products(&state.orm, rows).await?,
    })
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    let cart = load_cart(state, user, false).await?;
    Ok(ApiResponse::ok(cart))
}

pub async fn get_checked_items(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    let cart = load_cart(state, user, true).await?;
    Ok(ApiResponse::ok(cart))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    payload.validate()?;

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    let cart = find_or_create_cart(&state.orm, user.user_id).await?;

    let existing = CartItems::find()
        .filter(
            Condition::all()
                .add(ItemCol::CartId.eq(cart.id))
                .add(ItemCol::ProductId.eq(payload.product_id)),
        )
        .one(&state.orm)
        .await?;

    let item_id = match existing {
        Some(item) => {
            CartItems::update_many()
                .col_expr(ItemCol::Quantity, Expr::col(ItemCol::Quantity).add(payload.quantity))
                .filter(ItemCol::Id.eq(item.id))
                .exec(&state.orm)
                .await?;
            item.id
        }
        None => {
            CartItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                checked: Set(false),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
            .id
        }
    };

    let item = CartItems::find_by_id(item_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let item = with_products(&state.orm, vec![item])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", item, None))
}

pub async fn get_cart_items_by_ids(
    state: &AppState,
    user: &AuthUser,
    ids: Vec<Uuid>,
) -> AppResult<ApiResponse<CartItemList>> {
    let Some(cart) = find_cart(&state.orm, user.user_id).await? else {
        return Ok(ApiResponse::ok(CartItemList { items: Vec::new() }));
    };
    let rows = CartItems::find()
        .filter(
            Condition::all()
                .add(ItemCol::CartId.eq(cart.id))
                .add(ItemCol::Id.is_in(ids)),
        )
        .order_by_desc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = with_products(&state.orm, rows).await?;
    Ok(ApiResponse::success("OK", CartItemList { items }, None))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    payload.validate()?;
    let item = find_owned_item(&state.orm, user, item_id).await?;

    let mut active: CartItemActive = item.into();
    active.quantity = Set(payload.quantity);
    let item = active.update(&state.orm).await?;

    let item = with_products(&state.orm, vec![item])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Updated", item, None))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<Success>> {
    let item = find_owned_item(&state.orm, user, item_id).await?;
    CartItems::delete_by_id(item.id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": item.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        Success { success: true },
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Success>> {
    if let Some(cart) = find_cart(&state.orm, user.user_id).await? {
        CartItems::delete_many()
            .filter(ItemCol::CartId.eq(cart.id))
            .exec(&state.orm)
            .await?;
    }
    Ok(ApiResponse::success(
        "Cart cleared",
        Success { success: true },
        Some(Meta::empty()),
    ))
}

pub async fn get_cart_count(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CartCount>> {
    let count = match find_cart(&state.orm, user.user_id).await? {
        Some(cart) => {
            CartItems::find()
                .filter(ItemCol::CartId.eq(cart.id))
                .count(&state.orm)
                .await?
        }
        None => 0,
    };
    Ok(ApiResponse::success("OK", CartCount { count }, None))
}

pub async fn update_checked_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    checked: bool,
) -> AppResult<ApiResponse<CartItem>> {
    let item = find_owned_item(&state.orm, user, item_id).await?;
    let mut active: CartItemActive = item.into();
    active.checked = Set(checked);
    let item = active.update(&state.orm).await?;

    let item = with_products(&state.orm, vec![item])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Updated", item, None))
}

pub async fn update_checked_all(
    state: &AppState,
    user: &AuthUser,
    checked: bool,
) -> AppResult<ApiResponse<Success>> {
    if let Some(cart) = find_cart(&state.orm, user.user_id).await? {
        CartItems::update_many()
            .col_expr(ItemCol::Checked, Expr::value(checked))
            .filter(ItemCol::CartId.eq(cart.id))
            .exec(&state.orm)
            .await?;
    }
    Ok(ApiResponse::success("Updated", Success { success: true }, None))
}

/// Parse the comma separated `ids` query value.
pub fn parse_ids(raw: &str) -> AppResult<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| AppError::BadRequest(format!("invalid cart item id {s}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = parse_ids(&format!("{a}, {b},")).unwrap();
        assert_eq!(ids, vec![a, b]);
        assert!(parse_ids("").unwrap().is_empty());
        assert!(matches!(parse_ids("nope"), Err(AppError::BadRequest(_))));
    }
}
