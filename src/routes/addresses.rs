use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::addresses::{AddressList, AddressRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Address,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_addresses).post(create_address))
        .route("/primary", get(get_primary_address))
        .route(
            "/{id}",
            get(get_address_by_id)
                .put(update_address)
                .delete(delete_address),
        )
        .route("/{id}/primary", patch(set_primary_address))
}

#[utoipa::path(
    get,
    path = "/api/addresses",
    responses(
        (status = 200, description = "Caller's addresses, primary first", body = ApiResponse<AddressList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn get_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::get_addresses(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Created address", body = ApiResponse<Address>),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::create_address(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/addresses/primary",
    responses(
        (status = 200, description = "Primary address, null when none", body = ApiResponse<Address>)
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn get_primary_address(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Option<Address>>>> {
    let resp = address_service::get_primary_address(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Address", body = ApiResponse<Address>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn get_address_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::get_address_by_id(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Updated address", body = ApiResponse<Address>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::update_address(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Deleted address", body = ApiResponse<Address>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::delete_address(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/addresses/{id}/primary",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Address is now primary", body = ApiResponse<Address>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn set_primary_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::set_primary_address(&state, &user, id).await?;
    Ok(Json(resp))
}
