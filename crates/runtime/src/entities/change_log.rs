use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use tabletop_database::SqlxObject;

use super::{Inventory, InventoryItem, PlayerCharacter};

/// Append-only audit row. Rows go away with the character or item that owns
/// them; the inventory reference is nulled instead.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, SqlxObject)]
#[table_name = "change_logs"]
pub struct ChangeLog {
    pub id: Uuid,

    #[indexed]
    pub user_id: String,
    pub action: String,
    pub description: Option<String>,

    #[foreign_key(referenced_table = "player_characters", related_rust_type = "PlayerCharacter", on_delete = "cascade")]
    #[indexed]
    pub player_character_id: Option<Uuid>,

    #[foreign_key(referenced_table = "inventories", related_rust_type = "Inventory", on_delete = "set_null")]
    #[indexed]
    pub inventory_id: Option<Uuid>,

    #[foreign_key(referenced_table = "inventory_items", related_rust_type = "InventoryItem", on_delete = "cascade")]
    #[indexed]
    pub inventory_item_id: Option<Uuid>,

    pub created_at: i64,
    pub updated_at: i64,
}
