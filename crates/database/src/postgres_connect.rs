/// Creates the `updated_at` trigger function shared by every table.
pub const UPDATED_AT_FUNCTION_SQL: &str = r#"
CREATE OR REPLACE FUNCTION set_updated_at_unix_timestamp()
RETURNS TRIGGER AS $$
BEGIN NEW.updated_at = floor(extract(epoch from now())); RETURN NEW; END;
$$ language 'plpgsql';
"#;

/// Declares the process-wide connection pool and schema setup for a list of
/// `SqlxObject` types.
///
/// Types must be listed parents first: tables are created in the given order
/// and dropped in reverse.
///
/// # Generated Functions
/// - `async fn create_schema(pool: &PgPool, drop_tables: bool) -> anyhow::Result<()>`
/// - `async fn connect(drop_tables: bool, create_tables: bool) -> anyhow::Result<&'static PgPool>`:
///   builds the pool once from `DatabaseEnv` and reuses it afterwards.
///
/// # Example
/// ```rust,ignore
/// init_databases!(
///     default: [System, Party]
/// );
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let pool = connect(false, true).await?;
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! init_databases {
    (
        default: [$($default_type:ty),* $(,)?]
    ) => {
        static POOL: ::tokio::sync::OnceCell<::sqlx::PgPool> = ::tokio::sync::OnceCell::const_new();

        #[allow(dead_code)]
        pub async fn create_schema(pool: &::sqlx::PgPool, drop_tables: bool) -> ::anyhow::Result<()> {
            use ::anyhow::Context as _;

            if drop_tables {
                let mut drop_statements: Vec<(&'static str, String)> = Vec::new();
                $(
                    drop_statements.push((
                        stringify!($default_type),
                        <$default_type as $crate::SqlxSchema>::drop_table_sql(),
                    ));
                )*
                for (type_name, sql) in drop_statements.into_iter().rev() {
                    if let Err(e) = ::sqlx::query(&sql).execute(pool).await {
                        ::tracing::warn!("Failed to drop table for '{}': {:?}", type_name, e);
                    }
                }
            }

            ::sqlx::query($crate::UPDATED_AT_FUNCTION_SQL)
                .execute(pool)
                .await
                .context("Failed to create timestamp helper function")?;

            $(
                let create_table_sql_str = <$default_type as $crate::SqlxSchema>::create_table_sql();
                ::sqlx::query(&create_table_sql_str)
                    .execute(pool)
                    .await
                    .with_context(|| format!("Failed to create table for '{}'", stringify!($default_type)))?;
            )*

            $(
                let trigger_sql_str = <$default_type as $crate::SqlxSchema>::trigger_sql();
                for statement in trigger_sql_str.split(';').filter(|s| !s.trim().is_empty()) {
                    ::sqlx::query(statement)
                        .execute(pool)
                        .await
                        .with_context(|| format!("Failed to execute trigger for '{}': {}", stringify!($default_type), statement))?;
                }
            )*

            $(
                for index_sql in <$default_type as $crate::SqlxSchema>::INDEXES_SQL {
                    ::sqlx::query(index_sql)
                        .execute(pool)
                        .await
                        .with_context(|| format!("Failed to create index for '{}': {}", stringify!($default_type), index_sql))?;
                }
            )*

            ::tracing::info!("Database schema ready");
            Ok(())
        }

        #[allow(dead_code)]
        pub async fn connect(drop_tables: bool, create_tables: bool) -> ::anyhow::Result<&'static ::sqlx::PgPool> {
            POOL.get_or_try_init(|| async {
                let env = <$crate::DatabaseEnv as $crate::EnvVars>::load()?;
                let pool = env
                    .pool_options()
                    .connect_with(env.connect_options()?)
                    .await?;

                ::tracing::info!(
                    "Connected to PostgreSQL (pooler: {:?}, max connections: {})",
                    env.pooler,
                    env.max_connections
                );

                if drop_tables || create_tables {
                    create_schema(&pool, drop_tables).await?;
                }

                Ok::<_, ::anyhow::Error>(pool)
            }).await
        }
    };
}
