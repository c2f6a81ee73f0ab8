use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use validator::Validate;

use crate::{
    audit,
    dto::users::{UpdatePasswordRequest, UpdateProfileRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{User, user_from_entity},
    response::{ApiResponse, Meta},
    services::auth_service::hash_password,
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Profile", user_from_entity(model)?, None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;

    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(email) = payload.email.as_ref().filter(|e| **e != existing.email) {
        let taken = Users::find()
            .filter(UserCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email is already taken".into()));
        }
    }

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "profile_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        user_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_password(
    state: &AppState,
    user: &AuthUser,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    active.password_hash = Set(hash_password(&payload.password)?);
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "password_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Password updated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
