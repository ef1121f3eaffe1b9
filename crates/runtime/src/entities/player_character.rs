use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use tabletop_database::SqlxObject;

use super::{Party, System};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, SqlxObject)]
#[table_name = "player_characters"]
pub struct PlayerCharacter {
    pub id: Uuid,

    /// Opaque id issued by the external identity provider.
    #[indexed]
    pub user_id: String,

    pub name: String,
    pub description: Option<String>,

    #[foreign_key(referenced_table = "systems", related_rust_type = "System", on_delete = "cascade")]
    #[indexed]
    pub system_id: Uuid,

    #[foreign_key(referenced_table = "parties", related_rust_type = "Party", on_delete = "cascade")]
    #[indexed]
    pub party_id: Option<Uuid>,

    pub created_at: i64,
    pub updated_at: i64,
}
