use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod doc;
pub mod events;
pub mod health;
pub mod inventory;
pub mod kitchen;
pub mod menu;
pub mod orders;
pub mod params;
pub mod public;
pub mod reports;
pub mod settings;
pub mod tables;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", auth::users_router())
        .nest("/floors", tables::floors_router())
        .nest("/tables", tables::router())
        .nest("/categories", menu::categories_router())
        .nest("/menu-items", menu::menu_items_router())
        .nest("/inventory", inventory::router())
        .nest("/orders", orders::router())
        .nest("/kitchen", kitchen::router())
        .nest("/reports", reports::router())
        .nest("/settings", settings::router())
        .nest("/public", public::router())
        .nest("/events", events::router())
}
