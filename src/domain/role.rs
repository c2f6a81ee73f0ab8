use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Courier,
    User,
}

string_enum!(Role, "role", {
    Admin => "admin",
    Courier => "courier",
    User => "user",
});

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Courier)
    }
}
