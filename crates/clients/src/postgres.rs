use sqlx::PgPool;
use tabletop_common::define_module_client;
use tabletop_database::{init_databases, DatabaseEnv, EnvVars};

// Parents first: tables are created in this order and dropped in reverse.
init_databases!(
    default: [
        tabletop_runtime::System,
        tabletop_runtime::Party,
        tabletop_runtime::ItemTemplate,
        tabletop_runtime::PlayerCharacter,
        tabletop_runtime::Inventory,
        tabletop_runtime::InventoryItem,
        tabletop_runtime::ChangeLog
    ]
);

define_module_client! {
    (struct PostgresClient, "postgres")
    client_type: PgPool,
    env: [],
    env_any: ["DATABASE_URL", "DB_HOST"],
    setup: async {
        let env = DatabaseEnv::load()?;
        let pool = connect(false, env.create_tables).await?;
        Ok::<_, anyhow::Error>(pool.clone())
    }
}
