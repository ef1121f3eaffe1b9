#![allow(dead_code)]

use sqlx::types::Uuid;
use sqlx::PgPool;
use tabletop_database::{init_databases, DatabaseEnv, EnvVars};
use tabletop_runtime::{ChangeLog, Inventory, InventoryItem, ItemTemplate, Party, PlayerCharacter, System};
use tokio::sync::OnceCell;

init_databases!(
    default: [
        System,
        Party,
        ItemTemplate,
        PlayerCharacter,
        Inventory,
        InventoryItem,
        ChangeLog
    ]
);

static SCHEMA: OnceCell<()> = OnceCell::const_new();

/// Returns a fresh pool against `DATABASE_URL` with the schema applied once
/// per test binary, or `None` when no database is configured.
pub async fn test_pool() -> Option<PgPool> {
    let _ = dotenv::dotenv();
    if std::env::var("DATABASE_URL").map(|v| v.trim().is_empty()).unwrap_or(true) {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    }

    let env = DatabaseEnv::load().expect("database env");
    let pool = env
        .pool_options()
        .max_connections(5)
        .connect_with(env.connect_options().expect("connect options"))
        .await
        .expect("Failed to connect to Postgres for tests");

    SCHEMA
        .get_or_try_init(|| async { create_schema(&pool, false).await })
        .await
        .expect("One-time schema setup failed");

    Some(pool)
}

/// Unique per-run name so committed rows never collide across runs.
pub fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

#[macro_export]
macro_rules! require_db {
    () => {
        match common::test_pool().await {
            Some(pool) => pool,
            None => return Ok(()),
        }
    };
}
