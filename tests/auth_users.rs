mod common;

use axum::{extract::FromRequestParts, http::Request};
use storefront_api::{
    domain::role::Role,
    dto::{
        auth::{LoginRequest, RegisterRequest},
        users::{UpdatePasswordRequest, UpdateProfileRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{auth_service, user_service},
    state::AppState,
};

use common::setup_state;

async fn login(state: &AppState, email: &str, password: &str) -> Result<String, AppError> {
    let resp = auth_service::login_user(
        state,
        LoginRequest {
            email: email.into(),
            password: password.into(),
        },
    )
    .await?;
    Ok(resp.data.expect("token").token)
}

async fn extract(token: &str) -> Result<AuthUser, AppError> {
    let (mut parts, _) = Request::builder()
        .header("Authorization", format!("Bearer {token}"))
        .body(())
        .expect("request")
        .into_parts();
    AuthUser::from_request_parts(&mut parts, &()).await
}

#[tokio::test]
async fn register_login_and_profile() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    // SAFETY: this is the only test in the binary touching the environment.
    unsafe { std::env::set_var("JWT_SECRET", "integration-test-secret") };

    let user = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Siti".into(),
            email: "siti@example.com".into(),
            password: "rahasia123".into(),
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(user.role, Role::User);

    let duplicate = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Siti".into(),
            email: "siti@example.com".into(),
            password: "rahasia123".into(),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let short = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Joko".into(),
            email: "joko@example.com".into(),
            password: "short".into(),
        },
    )
    .await;
    assert!(matches!(short, Err(AppError::Validation(_))));

    let wrong = login(&state, "siti@example.com", "salah12345").await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    let token = login(&state, "siti@example.com", "rahasia123").await?;
    let auth = extract(&token).await?;
    assert_eq!(auth.user_id, user.id);
    assert_eq!(auth.role, Role::User);

    let garbage = extract("not-a-token").await;
    assert!(matches!(garbage, Err(AppError::Unauthorized(_))));

    auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Joko".into(),
            email: "joko@example.com".into(),
            password: "rahasia123".into(),
        },
    )
    .await?;
    let taken = user_service::update_profile(
        &state,
        &auth,
        UpdateProfileRequest {
            name: None,
            email: Some("joko@example.com".into()),
            image: None,
        },
    )
    .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    let renamed = user_service::update_profile(
        &state,
        &auth,
        UpdateProfileRequest {
            name: Some("Siti Rahma".into()),
            email: None,
            image: None,
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(renamed.name, "Siti Rahma");
    assert_eq!(renamed.email, "siti@example.com");

    user_service::update_password(
        &state,
        &auth,
        UpdatePasswordRequest {
            password: "baru-sekali-123".into(),
        },
    )
    .await?;
    assert!(login(&state, "siti@example.com", "rahasia123").await.is_err());
    login(&state, "siti@example.com", "baru-sekali-123").await?;

    Ok(())
}
