use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use restaurant_pos_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin123", "admin", "Administrator").await?;
    ensure_user(&pool, "manager", "manager123", "manager", "Floor Manager").await?;
    ensure_user(&pool, "cashier", "cashier123", "cashier", "Front Desk").await?;
    ensure_user(&pool, "waiter", "waiter123", "waiter", "Service Staff").await?;
    ensure_user(&pool, "kitchen", "kitchen123", "kitchen", "Kitchen Display").await?;

    ensure_settings(&pool).await?;
    let floor_id = ensure_floor(&pool, "Ground Floor", 0).await?;
    seed_tables(&pool, floor_id, 6).await?;
    seed_menu(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    role: &str,
    full_name: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash, role, full_name)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .bind(full_name)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn ensure_settings(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM restaurant_settings LIMIT 1")
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        sqlx::query(
            r#"
            INSERT INTO restaurant_settings
                (id, restaurant_name, address, phone, gstin, tax_rate_bps, upi_vpa)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind("Spice Garden")
        .bind("12 MG Road, Bengaluru")
        .bind("+91 80 4000 1234")
        .bind("29ABCDE1234F1Z5")
        .bind(1800i32)
        .bind("spicegarden@upi")
        .execute(pool)
        .await?;
        println!("Seeded restaurant settings");
    }
    Ok(())
}

async fn ensure_floor(pool: &sqlx::PgPool, name: &str, number: i32) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM floors WHERE floor_number = $1")
            .bind(number)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO floors (id, name, floor_number) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(number)
        .execute(pool)
        .await?;
    println!("Seeded floor {name}");
    Ok(id)
}

async fn seed_tables(pool: &sqlx::PgPool, floor_id: Uuid, count: i32) -> anyhow::Result<()> {
    for table_number in 1..=count {
        sqlx::query(
            r#"
            INSERT INTO restaurant_tables (id, floor_id, table_number, capacity, qr_token)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (floor_id, table_number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(floor_id)
        .bind(table_number)
        .bind(4i32)
        .bind(Uuid::new_v4())
        .execute(pool)
        .await?;
    }
    println!("Seeded {count} tables");
    Ok(())
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (category, display_order, items: name, description, price in paise, dietary tag)
    let menu: Vec<(&str, i32, Vec<(&str, &str, i64, &str)>)> = vec![
        (
            "Starters",
            1,
            vec![
                ("Paneer Tikka", "Char-grilled cottage cheese", 22_000, "veg"),
                ("Chicken 65", "Fried chicken, curry leaves", 26_000, "non_veg"),
            ],
        ),
        (
            "Mains",
            2,
            vec![
                ("Dal Makhani", "Slow-cooked black lentils", 24_000, "veg"),
                ("Butter Chicken", "Tomato and butter gravy", 32_000, "non_veg"),
                ("Veg Biryani", "Basmati rice, seasonal vegetables", 28_000, "veg"),
            ],
        ),
        (
            "Breads",
            3,
            vec![
                ("Butter Naan", "Tandoor-baked", 6_000, "veg"),
                ("Garlic Naan", "Tandoor-baked, garlic butter", 7_000, "veg"),
            ],
        ),
        (
            "Beverages",
            4,
            vec![
                ("Masala Chai", "Spiced tea", 5_000, "veg"),
                ("Fresh Lime Soda", "Sweet or salted", 8_000, "veg"),
            ],
        ),
    ];

    for (category, display_order, items) in menu {
        let category_id: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO categories (id, name, display_order)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET display_order = EXCLUDED.display_order
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category)
        .bind(display_order)
        .fetch_one(pool)
        .await?;

        for (name, description, price, tag) in items {
            let existing: Option<(Uuid,)> = sqlx::query_as(
                "SELECT id FROM menu_items WHERE category_id = $1 AND name = $2",
            )
            .bind(category_id.0)
            .bind(name)
            .fetch_optional(pool)
            .await?;
            if existing.is_some() {
                continue;
            }
            let item_id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO menu_items (id, category_id, name, description, price, dietary_tag)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item_id)
            .bind(category_id.0)
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(tag)
            .execute(pool)
            .await?;
            sqlx::query(
                r#"
                INSERT INTO inventory
                    (id, menu_item_id, total_quantity, current_stock, low_stock_threshold)
                VALUES ($1, $2, $3, $3, $4)
                ON CONFLICT (menu_item_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(item_id)
            .bind(100i32)
            .bind(10i32)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded menu");
    Ok(())
}
