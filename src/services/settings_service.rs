use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::settings::UpdateSettingsRequest,
    entity::restaurant_settings::{
        ActiveModel as SettingsActive, Entity as RestaurantSettingsEntity, Model as SettingsModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure},
    models::RestaurantSettings,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Fetch the single settings row, creating it with defaults on first use.
/// Every terminal reads the same row, so tax rate and UPI id cannot drift
/// between devices.
pub async fn load<C: ConnectionTrait>(conn: &C) -> AppResult<SettingsModel> {
    if let Some(settings) = RestaurantSettingsEntity::find().one(conn).await? {
        return Ok(settings);
    }
    let settings = SettingsActive {
        id: Set(Uuid::new_v4()),
        restaurant_name: NotSet,
        address: NotSet,
        phone: NotSet,
        gstin: NotSet,
        tax_rate_bps: NotSet,
        service_charge_bps: NotSet,
        currency: NotSet,
        upi_vpa: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(settings)
}

pub async fn get_settings(state: &AppState) -> AppResult<ApiResponse<RestaurantSettings>> {
    let settings = load(&state.orm).await?;
    Ok(ApiResponse::success(
        "Settings",
        settings_from_entity(settings),
        Some(Meta::empty()),
    ))
}

pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateSettingsRequest,
) -> AppResult<ApiResponse<RestaurantSettings>> {
    ensure(user, Capability::ManageSettings)?;

    if let Some(rate) = payload.tax_rate_bps {
        if !(0..=10_000).contains(&rate) {
            return Err(AppError::BadRequest(
                "Tax rate must be between 0 and 10000 basis points".into(),
            ));
        }
    }
    if let Some(charge) = payload.service_charge_bps {
        if !(0..=10_000).contains(&charge) {
            return Err(AppError::BadRequest(
                "Service charge must be between 0 and 10000 basis points".into(),
            ));
        }
    }

    let existing = load(&state.orm).await?;
    let mut active: SettingsActive = existing.into();
    if let Some(v) = payload.restaurant_name {
        active.restaurant_name = Set(v);
    }
    if let Some(v) = payload.address {
        active.address = Set(v);
    }
    if let Some(v) = payload.phone {
        active.phone = Set(v);
    }
    if let Some(v) = payload.gstin {
        active.gstin = Set(v);
    }
    if let Some(v) = payload.tax_rate_bps {
        active.tax_rate_bps = Set(v);
    }
    if let Some(v) = payload.service_charge_bps {
        active.service_charge_bps = Set(v);
    }
    if let Some(v) = payload.currency {
        active.currency = Set(v);
    }
    if let Some(v) = payload.upi_vpa {
        active.upi_vpa = Set(v);
    }
    active.updated_at = Set(Utc::now().into());
    let settings = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "settings_update",
        Some("restaurant_settings"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Settings updated",
        settings_from_entity(settings),
        Some(Meta::empty()),
    ))
}

fn settings_from_entity(model: SettingsModel) -> RestaurantSettings {
    RestaurantSettings {
        id: model.id,
        restaurant_name: model.restaurant_name,
        address: model.address,
        phone: model.phone,
        gstin: model.gstin,
        tax_rate_bps: model.tax_rate_bps,
        service_charge_bps: model.service_charge_bps,
        currency: model.currency,
        upi_vpa: model.upi_vpa,
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
