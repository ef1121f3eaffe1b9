use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use tabletop_database::SqlxObject;

use super::{Inventory, ItemTemplate};

/// A stack of one item template inside an inventory. At most one row exists
/// per (inventory, template) pair.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, SqlxObject)]
#[table_name = "inventory_items"]
#[unique_together = "inventory_id, item_template_id"]
pub struct InventoryItem {
    pub id: Uuid,

    #[sql_default = "1"]
    #[sql_check = "\"quantity\" >= 0"]
    pub quantity: i32,

    #[foreign_key(referenced_table = "inventories", related_rust_type = "Inventory", on_delete = "cascade")]
    #[indexed]
    pub inventory_id: Uuid,

    #[foreign_key(referenced_table = "item_templates", related_rust_type = "ItemTemplate", on_delete = "cascade")]
    #[indexed]
    pub item_template_id: Uuid,

    pub created_at: i64,
    pub updated_at: i64,
}
