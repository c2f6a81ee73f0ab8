use sea_orm::sea_query::{Expr, LockType};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::addresses::{AddressList, AddressRequest},
    entity::{
        addresses::{
            ActiveModel as AddressActive, Column as AddrCol, Entity as Addresses,
            Model as AddressModel,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, address_from_entity},
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<AddressModel> {
    Addresses::find()
        .filter(
            Condition::all()
                .add(AddrCol::Id.eq(id))
                .add(AddrCol::UserId.eq(user.user_id)),
        )
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    // Creates for the same user queue on the owner row, so only the first
    // address ever sees an empty book and becomes primary.
    Users::find_by_id(user.user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Addresses::find()
        .filter(AddrCol::UserId.eq(user.user_id))
        .count(&txn)
        .await?;

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(payload.name),
        phone: Set(payload.phone),
        email: Set(payload.email),
        address: Set(payload.address),
        city: Set(payload.city),
        postal_code: Set(payload.postal_code),
        province: Set(payload.province),
        is_primary: Set(existing == 0),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_create",
        "addresses",
        serde_json::json!({ "address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address created",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    payload.validate()?;
    let existing = find_owned(&state.orm, user, id).await?;

    let mut active: AddressActive = existing.into();
    active.name = Set(payload.name);
    active.phone = Set(payload.phone);
    active.email = Set(payload.email);
    active.address = Set(payload.address);
    active.city = Set(payload.city);
    active.postal_code = Set(payload.postal_code);
    active.province = Set(payload.province);
    let address = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Address updated",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    let existing = find_owned(&state.orm, user, id).await?;
    Addresses::delete_by_id(existing.id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_delete",
        "addresses",
        serde_json::json!({ "address_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address deleted",
        address_from_entity(existing),
        Some(Meta::empty()),
    ))
}

/// Make `id` the user's only primary address.
///
/// The user's address rows are locked first, so concurrent calls for the same
/// user run one after another and exactly one row ends up primary.
pub async fn set_primary_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    let txn = state.orm.begin().await?;

    let rows = Addresses::find()
        .filter(AddrCol::UserId.eq(user.user_id))
        .order_by_asc(AddrCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let target = rows
        .into_iter()
        .find(|a| a.id == id)
        .ok_or(AppError::NotFound)?;

    Addresses::update_many()
        .col_expr(AddrCol::IsPrimary, Expr::value(false))
        .filter(AddrCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    let mut active: AddressActive = target.into();
    active.is_primary = Set(true);
    let address = active.update(&txn).await?;

    txn.commit().await?;

    tracing::debug!(user_id = %user.user_id, address_id = %id, "primary address changed");

    Ok(ApiResponse::success(
        "Primary address updated",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

pub async fn get_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = Addresses::find()
        .filter(AddrCol::UserId.eq(user.user_id))
        .order_by_desc(AddrCol::IsPrimary)
        .order_by_asc(AddrCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(address_from_entity)
        .collect();
    Ok(ApiResponse::success("Addresses", AddressList { items }, None))
}

pub async fn get_address_by_id(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    let address = find_owned(&state.orm, user, id).await?;
    Ok(ApiResponse::success("Address", address_from_entity(address), None))
}

pub async fn get_primary_address(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Option<Address>>> {
    let address = Addresses::find()
        .filter(
            Condition::all()
                .add(AddrCol::UserId.eq(user.user_id))
                .add(AddrCol::IsPrimary.eq(true)),
        )
        .one(&state.orm)
        .await?
        .map(address_from_entity);
    Ok(ApiResponse::success("Primary address", address, None))
}
