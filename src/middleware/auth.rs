use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{domain::role::Role, dto::auth::Claims, error::AppError};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Owners see their own records; staff see everything.
    pub fn can_view(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_staff()
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let secret = jwt_secret()?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
        let role = decoded
            .claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::Unauthorized("Invalid role in token".into()))?;

        Ok(AuthUser { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn role_guards() {
        assert!(ensure_admin(&user(Role::Admin)).is_ok());
        assert!(matches!(
            ensure_admin(&user(Role::Courier)),
            Err(AppError::Forbidden)
        ));
        assert!(ensure_staff(&user(Role::Courier)).is_ok());
        assert!(ensure_staff(&user(Role::User)).is_err());
    }

    #[test]
    fn owners_and_staff_can_view() {
        let customer = user(Role::User);
        assert!(customer.can_view(customer.user_id));
        assert!(!customer.can_view(Uuid::new_v4()));
        assert!(user(Role::Courier).can_view(customer.user_id));
    }
}
