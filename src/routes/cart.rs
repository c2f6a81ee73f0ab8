use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{
        AddToCartRequest, CartCount, CartItemIdsQuery, CartItemList, Success,
        UpdateCartItemRequest, UpdateCheckedRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Cart, CartItem},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/count", get(get_cart_count))
        .route("/checked", get(get_checked_items).patch(update_checked_all))
        .route("/items", post(add_item).get(get_cart_items_by_ids))
        .route("/items/{id}", patch(update_item).delete(remove_item))
        .route("/items/{id}/checked", patch(update_checked_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Caller's cart", body = ApiResponse<Cart>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let resp = cart_service::get_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/checked",
    responses(
        (status = 200, description = "Items selected for checkout", body = ApiResponse<Cart>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_checked_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let resp = cart_service::get_checked_items(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added or quantity increased", body = ApiResponse<CartItem>),
        (status = 400, description = "Product not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/items",
    params(CartItemIdsQuery),
    responses(
        (status = 200, description = "Cart items by id", body = ApiResponse<CartItemList>),
        (status = 400, description = "Malformed id list")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart_items_by_ids(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CartItemIdsQuery>,
) -> AppResult<Json<ApiResponse<CartItemList>>> {
    let ids = cart_service::parse_ids(&query.ids)?;
    let resp = cart_service::get_cart_items_by_ids(&state, &user, ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<CartItem>),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::update_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<Success>),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Success>>> {
    let resp = cart_service::remove_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<Success>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Success>>> {
    let resp = cart_service::clear_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/count",
    responses(
        (status = 200, description = "Number of distinct items", body = ApiResponse<CartCount>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let resp = cart_service::get_cart_count(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{id}/checked",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateCheckedRequest,
    responses(
        (status = 200, description = "Selection updated", body = ApiResponse<CartItem>),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_checked_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCheckedRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::update_checked_item(&state, &user, id, payload.checked).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/checked",
    request_body = UpdateCheckedRequest,
    responses(
        (status = 200, description = "Selection updated for every item", body = ApiResponse<Success>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_checked_all(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateCheckedRequest>,
) -> AppResult<Json<ApiResponse<Success>>> {
    let resp = cart_service::update_checked_all(&state, &user, payload.checked).await?;
    Ok(Json(resp))
}
