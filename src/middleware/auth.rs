use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::Role, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Everything a role may do, checked in one place instead of per-page
/// allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageUsers,
    ManageSettings,
    ManageMenu,
    ManageTables,
    ManageInventory,
    TakeOrders,
    UpdateKitchen,
    ProcessPayments,
    ViewReports,
}

pub fn role_allows(role: Role, cap: Capability) -> bool {
    use Capability::*;
    match role {
        Role::Admin => true,
        Role::Manager => !matches!(cap, ManageUsers),
        Role::Cashier => matches!(cap, TakeOrders | ProcessPayments | ViewReports),
        Role::Waiter => matches!(cap, TakeOrders | ManageTables),
        Role::Kitchen => matches!(cap, UpdateKitchen),
    }
}

pub fn ensure(user: &AuthUser, cap: Capability) -> Result<(), AppError> {
    if !role_allows(user.role, cap) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized)?;

        let role = Role::parse(&decoded.claims.role).ok_or(AppError::Unauthorized)?;

        Ok(AuthUser { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_do_everything() {
        for cap in [
            Capability::ManageUsers,
            Capability::ManageSettings,
            Capability::ProcessPayments,
            Capability::UpdateKitchen,
        ] {
            assert!(role_allows(Role::Admin, cap));
        }
    }

    #[test]
    fn manager_cannot_manage_users() {
        assert!(!role_allows(Role::Manager, Capability::ManageUsers));
        assert!(role_allows(Role::Manager, Capability::ManageSettings));
        assert!(role_allows(Role::Manager, Capability::ProcessPayments));
    }

    #[test]
    fn kitchen_is_limited_to_kitchen_ops() {
        assert!(role_allows(Role::Kitchen, Capability::UpdateKitchen));
        assert!(!role_allows(Role::Kitchen, Capability::TakeOrders));
        assert!(!role_allows(Role::Kitchen, Capability::ViewReports));
    }

    #[test]
    fn waiter_takes_orders_but_cannot_bill() {
        assert!(role_allows(Role::Waiter, Capability::TakeOrders));
        assert!(role_allows(Role::Waiter, Capability::ManageTables));
        assert!(!role_allows(Role::Waiter, Capability::ProcessPayments));
    }
}
