pub mod audit_logs;
pub mod categories;
pub mod floors;
pub mod inventory;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod restaurant_settings;
pub mod restaurant_tables;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use floors::Entity as Floors;
pub use inventory::Entity as Inventory;
pub use menu_items::Entity as MenuItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use restaurant_settings::Entity as RestaurantSettings;
pub use restaurant_tables::Entity as RestaurantTables;
pub use users::Entity as Users;
