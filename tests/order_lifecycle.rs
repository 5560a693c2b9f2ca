use chrono::Utc;
use restaurant_pos_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        inventory::{RestockRequest, UpsertInventoryRequest},
        orders::{CartLine, CreateOrderRequest, PaymentRequest, PrepareRequest, PublicOrderRequest},
        reports::ReportQuery,
    },
    entity::{
        categories::ActiveModel as CategoryActive, floors::ActiveModel as FloorActive,
        inventory::ActiveModel as InventoryActive, inventory::Column as InventoryCol,
        inventory::Entity as Inventory, menu_items::ActiveModel as MenuItemActive,
        restaurant_tables::ActiveModel as TableActive, restaurant_tables::Entity as Tables,
        users::ActiveModel as UserActive,
    },
    events::EventBus,
    middleware::auth::AuthUser,
    models::{OrderSource, OrderStatus, PaymentMethod, PaymentStatus, Role},
    services::{inventory_service, kitchen_service, order_service, report_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement,
};
use uuid::Uuid;

// Full dine-in flow: waiter opens an order -> kitchen prepares every item ->
// cashier settles -> reports see the revenue. Then a customer orders through
// the table QR token.
#[tokio::test]
async fn dine_in_order_lifecycle() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    let waiter_id = create_user(&state, "waiter", "flow_waiter").await?;
    let kitchen_id = create_user(&state, "kitchen", "flow_kitchen").await?;
    let cashier_id = create_user(&state, "cashier", "flow_cashier").await?;
    let admin_id = create_user(&state, "admin", "flow_admin").await?;

    let waiter = AuthUser {
        user_id: waiter_id,
        role: Role::Waiter,
    };
    let kitchen = AuthUser {
        user_id: kitchen_id,
        role: Role::Kitchen,
    };
    let cashier = AuthUser {
        user_id: cashier_id,
        role: Role::Cashier,
    };
    let admin = AuthUser {
        user_id: admin_id,
        role: Role::Admin,
    };

    // Seed one floor with one table and a two-item menu, each item stocked at 10.
    let floor = FloorActive {
        id: Set(Uuid::new_v4()),
        name: Set("Ground".into()),
        floor_number: Set(0),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let qr_token = Uuid::new_v4();
    let table = TableActive {
        id: Set(Uuid::new_v4()),
        floor_id: Set(floor.id),
        table_number: Set(1),
        capacity: Set(4),
        status: Set("available".into()),
        qr_token: Set(qr_token),
        current_order_id: Set(None),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Mains".into()),
        display_order: Set(1),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let curry = seed_menu_item(&state, category.id, "Paneer Curry", 25_000).await?;
    let naan = seed_menu_item(&state, category.id, "Butter Naan", 6_000).await?;

    // Waiter opens the order: 1 curry + 2 naan = 37_000, 18% tax = 6_660.
    let created = order_service::create_order(
        &state,
        &waiter,
        CreateOrderRequest {
            table_id: table.id,
            customer_name: "Asha".into(),
            guest_count: 2,
            items: vec![
                CartLine {
                    menu_item_id: curry,
                    quantity: 1,
                    note: None,
                },
                CartLine {
                    menu_item_id: naan,
                    quantity: 2,
                    note: Some("extra butter".into()),
                },
            ],
        },
    )
    .await?;
    let created = created.data.unwrap();
    let order = created.order;
    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(order.status, OrderStatus::Active);
    assert_eq!(order.source, OrderSource::Staff);
    assert_eq!(order.subtotal, 37_000);
    assert_eq!(order.tax, 6_660);
    assert_eq!(order.total, 43_660);
    assert_eq!(created.items.len(), 2);

    // Table is now occupied and linked; stock dropped for both lines.
    let occupied = Tables::find_by_id(table.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(occupied.status, "occupied");
    assert_eq!(occupied.current_order_id, Some(order.id));
    assert_eq!(stock_of(&state, curry).await?, 9);
    assert_eq!(stock_of(&state, naan).await?, 8);

    // A second order on the occupied table is refused.
    let refused = order_service::create_order(
        &state,
        &waiter,
        CreateOrderRequest {
            table_id: table.id,
            customer_name: "Walk-in".into(),
            guest_count: 1,
            items: vec![CartLine {
                menu_item_id: naan,
                quantity: 1,
                note: None,
            }],
        },
    )
    .await;
    assert!(refused.is_err(), "occupied table must refuse a new order");

    // Settling before the food is served is refused.
    let early_pay = order_service::pay_order(
        &state,
        &cashier,
        order.id,
        PaymentRequest {
            method: PaymentMethod::Cash,
            room_number: None,
            guest_name: None,
        },
    )
    .await;
    assert!(early_pay.is_err(), "unserved order must refuse payment");

    // Kitchen marks each item prepared; the last toggle promotes the order.
    let mut last = None;
    for item in &created.items {
        let resp = kitchen_service::toggle_prepared(
            &state,
            &kitchen,
            item.id,
            PrepareRequest { prepared: true },
        )
        .await?;
        last = resp.data;
    }
    let board_order = last.unwrap();
    assert_eq!(board_order.order.status, OrderStatus::Serving);
    assert!(board_order.items.iter().all(|i| i.prepared));

    let serving = Tables::find_by_id(table.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(serving.status, "serving");

    // Un-marking and re-marking an item must not disturb the serving state.
    let first_item = created.items[0].id;
    kitchen_service::toggle_prepared(&state, &kitchen, first_item, PrepareRequest {
        prepared: false,
    })
    .await?;
    let again = kitchen_service::toggle_prepared(&state, &kitchen, first_item, PrepareRequest {
        prepared: true,
    })
    .await?;
    assert_eq!(again.data.unwrap().order.status, OrderStatus::Serving);

    // Cashier settles in cash: order completes and the table frees up.
    let paid = order_service::pay_order(
        &state,
        &cashier,
        order.id,
        PaymentRequest {
            method: PaymentMethod::Cash,
            room_number: None,
            guest_name: None,
        },
    )
    .await?;
    let paid = paid.data.unwrap();
    assert_eq!(paid.status, OrderStatus::Completed);
    assert_eq!(paid.payment_method, Some(PaymentMethod::Cash));
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert!(paid.completed_at.is_some());

    let freed = Tables::find_by_id(table.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(freed.status, "available");
    assert_eq!(freed.current_order_id, None);

    // Settling twice is refused.
    let double_pay = order_service::pay_order(
        &state,
        &cashier,
        order.id,
        PaymentRequest {
            method: PaymentMethod::Card,
            room_number: None,
            guest_name: None,
        },
    )
    .await;
    assert!(double_pay.is_err(), "settled order must refuse payment");

    // The day's summary sees exactly this one settled order.
    let today = Utc::now().date_naive();
    let summary = report_service::summary(
        &state,
        &admin,
        ReportQuery {
            from: today,
            to: today,
            group_by: None,
        },
    )
    .await?;
    let summary = summary.data.unwrap();
    assert_eq!(summary.order_count, 1);
    assert_eq!(summary.total_revenue, 43_660);
    assert_eq!(summary.outstanding_credit, 0);

    // Customer orders through the table QR code now that the table is free.
    let public = order_service::create_public_order(
        &state,
        PublicOrderRequest {
            qr_token,
            customer_name: "Ravi".into(),
            guest_count: 1,
            items: vec![CartLine {
                menu_item_id: naan,
                quantity: 1,
                note: None,
            }],
        },
    )
    .await?;
    let public = public.data.unwrap();
    assert_eq!(public.order.source, OrderSource::Customer);
    // Stock keeps dropping on the customer path too.
    assert_eq!(stock_of(&state, naan).await?, 7);

    // Raising the threshold puts the naan on the low-stock list.
    inventory_service::upsert_inventory(&state, &admin, UpsertInventoryRequest {
        menu_item_id: naan,
        low_stock_threshold: 8,
        initial_stock: None,
    })
    .await?;
    let low = inventory_service::list_low_stock(&state, &admin).await?;
    assert!(
        low.data
            .unwrap()
            .items
            .iter()
            .any(|i| i.menu_item_id == naan),
        "expected naan in the low-stock list"
    );

    // Restocking bumps both counters.
    let inv = Inventory::find()
        .filter(InventoryCol::MenuItemId.eq(naan))
        .one(&state.orm)
        .await?
        .unwrap();
    let restocked = inventory_service::restock(&state, &admin, inv.id, RestockRequest {
        quantity: 20,
    })
    .await?;
    let restocked = restocked.data.unwrap();
    assert_eq!(restocked.current_stock, 27);
    assert_eq!(restocked.total_quantity, inv.total_quantity + 20);

    // A restock that would overflow the counters is rejected, and the stored
    // quantities are untouched.
    let overflow = inventory_service::restock(&state, &admin, inv.id, RestockRequest {
        quantity: i32::MAX,
    })
    .await;
    assert!(overflow.is_err(), "expected an oversized restock to fail");
    assert_eq!(stock_of(&state, naan).await?, 27);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, inventory, menu_items, categories, \
         restaurant_tables, floors, restaurant_settings, audit_logs, users \
         RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "test-secret".into(),
            public_base_url: "http://localhost:3000".into(),
        },
        pool,
        orm,
        events: EventBus::default(),
    })
}

async fn create_user(state: &AppState, role: &str, username: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        full_name: Set(String::new()),
        phone: Set(None),
        email: Set(None),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn seed_menu_item(
    state: &AppState,
    category_id: Uuid,
    name: &str,
    price: i64,
) -> anyhow::Result<Uuid> {
    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        dietary_tag: Set("veg".into()),
        available: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    InventoryActive {
        id: Set(Uuid::new_v4()),
        menu_item_id: Set(item.id),
        total_quantity: Set(10),
        current_stock: Set(10),
        low_stock_threshold: Set(2),
        last_restocked_at: Set(None),
        last_restocked_by: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(item.id)
}

async fn stock_of(state: &AppState, menu_item_id: Uuid) -> anyhow::Result<i32> {
    let inv = Inventory::find()
        .filter(InventoryCol::MenuItemId.eq(menu_item_id))
        .one(&state.orm)
        .await?
        .unwrap();
    Ok(inv.current_stock)
}
