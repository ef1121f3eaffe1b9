use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use tabletop_database::SqlxObject;

use super::PlayerCharacter;

/// One per player character, created in the same transaction as the character.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, SqlxObject)]
#[table_name = "inventories"]
pub struct Inventory {
    pub id: Uuid,

    #[foreign_key(referenced_table = "player_characters", related_rust_type = "PlayerCharacter", on_delete = "cascade")]
    #[unique]
    pub player_character_id: Uuid,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Inventory {
    pub fn for_character(player_character_id: Uuid) -> Self {
        Self {
            player_character_id,
            ..Default::default()
        }
    }
}
