mod env;
mod postgres_connect;
mod sqlx_postgres;

pub use env::{DatabaseEnv, PoolerMode};
pub use postgres_connect::UPDATED_AT_FUNCTION_SQL;
pub use sqlx_postgres::*;
pub use tabletop_common::EnvVars;
pub use tabletop_db_macros::SqlxObject;
