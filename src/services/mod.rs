pub mod auth_service;
pub mod inventory_service;
pub mod kitchen_service;
pub mod menu_service;
pub mod order_service;
pub mod report_service;
pub mod settings_service;
pub mod table_service;
