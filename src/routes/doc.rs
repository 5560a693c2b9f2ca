use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, UserList},
        inventory::{InventoryList, RestockRequest, UpsertInventoryRequest},
        menu::{
            CategoryList, CategoryWithItems, CreateCategoryRequest, CreateMenuItemRequest,
            MenuItemList, PublicMenu, UpdateCategoryRequest, UpdateMenuItemRequest,
        },
        orders::{
            CartLine, CreateOrderRequest, KitchenBoard, KitchenOrder, OrderList, OrderWithItems,
            PaymentRequest, PrepareRequest, PublicOrderRequest, UpdateOrderStatusRequest,
            UpiPayload,
        },
        reports::{
            DishStat, GroupBy, PaymentMethodBreakdown, PaymentMethodStat, ReportQuery,
            SummaryReport, TimeBucket, TimeSeries, TopDishes,
        },
        settings::UpdateSettingsRequest,
        tables::{
            CreateFloorRequest, CreateTableRequest, FloorList, TableList, UpdateFloorRequest,
            UpdateTableRequest,
        },
    },
    events::{ChangeAction, ChangeEvent, Collection},
    models::{
        Category, DietaryTag, Floor, InventoryItem, MenuItem, Order, OrderItem, OrderPriority,
        OrderSource, OrderStatus, PaymentMethod, PaymentStatus, RestaurantSettings,
        RestaurantTable, Role, StockStatus, TableStatus, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, events, health, inventory, kitchen, menu, orders, params, public, reports, settings,
        tables,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::list_users,
        auth::create_user,
        auth::update_user,
        tables::list_floors,
        tables::create_floor,
        tables::update_floor,
        tables::list_tables,
        tables::create_table,
        tables::update_table,
        tables::table_qr,
        menu::list_categories,
        menu::create_category,
        menu::update_category,
        menu::list_menu_items,
        menu::create_menu_item,
        menu::update_menu_item,
        inventory::list_inventory,
        inventory::list_low_stock,
        inventory::upsert_inventory,
        inventory::restock,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_status,
        orders::pay_order,
        orders::bill,
        orders::kot,
        orders::upi_qr,
        kitchen::board,
        kitchen::toggle_prepared,
        reports::summary,
        reports::timeseries,
        reports::payment_methods,
        reports::top_dishes,
        reports::export_csv,
        reports::export_html,
        settings::get_settings,
        settings::update_settings,
        public::public_menu,
        public::create_public_order,
        events::subscribe
    ),
    components(
        schemas(
            User,
            Role,
            Floor,
            RestaurantTable,
            TableStatus,
            Category,
            MenuItem,
            DietaryTag,
            InventoryItem,
            StockStatus,
            Order,
            OrderItem,
            OrderStatus,
            OrderSource,
            OrderPriority,
            PaymentMethod,
            PaymentStatus,
            RestaurantSettings,
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            CreateFloorRequest,
            UpdateFloorRequest,
            FloorList,
            CreateTableRequest,
            UpdateTableRequest,
            TableList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemList,
            CategoryWithItems,
            PublicMenu,
            UpsertInventoryRequest,
            RestockRequest,
            InventoryList,
            CartLine,
            CreateOrderRequest,
            PublicOrderRequest,
            UpdateOrderStatusRequest,
            PaymentRequest,
            PrepareRequest,
            OrderWithItems,
            OrderList,
            KitchenOrder,
            KitchenBoard,
            UpiPayload,
            GroupBy,
            ReportQuery,
            SummaryReport,
            TimeBucket,
            TimeSeries,
            PaymentMethodStat,
            PaymentMethodBreakdown,
            DishStat,
            TopDishes,
            UpdateSettingsRequest,
            ChangeEvent,
            ChangeAction,
            Collection,
            params::Pagination,
            params::SortOrder,
            params::OrderListQuery,
            Meta,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<KitchenBoard>,
            ApiResponse<InventoryList>,
            ApiResponse<PublicMenu>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication"),
        (name = "Users", description = "Staff accounts"),
        (name = "Tables", description = "Floors, dining tables and QR codes"),
        (name = "Menu", description = "Categories and menu items"),
        (name = "Inventory", description = "Stock tracking"),
        (name = "Orders", description = "Order lifecycle and billing"),
        (name = "Kitchen", description = "Kitchen display"),
        (name = "Reports", description = "Sales analytics"),
        (name = "Settings", description = "Restaurant configuration"),
        (name = "Public", description = "Customer QR ordering, no auth"),
        (name = "Events", description = "Change notifications"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
