use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tokio::fs;

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

/// Create the sqlx pool used for raw queries and `sqlx::migrate!`.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
/// Used by the `migrate` bin target and the integration tests; the server itself
/// runs `sqlx::migrate!` at startup.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    for file in files {
        let sql = fs::read_to_string(&file).await?;
        // Run each file unprepared so multi-statement scripts, including
        // semicolons inside string literals and function bodies, execute as-is.
        conn.execute_unprepared(&sql).await?;
    }

    Ok(())
}
