use serde::{Deserialize, Serialize};
use sqlx::types::{BigDecimal, Json, Uuid};
use tabletop_database::SqlxObject;

use super::{Party, System};

/// A reusable item definition, either system-wide (`party_id` is `None`) or
/// scoped to a single party of the same system.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, SqlxObject)]
#[table_name = "item_templates"]
pub struct ItemTemplate {
    pub id: Uuid,

    pub name: String,
    pub description: Option<String>,
    pub weight: Option<BigDecimal>,
    pub value: Option<BigDecimal>,
    pub rarity: Option<String>,
    pub item_type: Option<String>,
    pub tags: Option<Json<serde_json::Value>>,

    #[foreign_key(referenced_table = "systems", related_rust_type = "System", on_delete = "cascade")]
    #[indexed]
    pub system_id: Uuid,

    #[foreign_key(referenced_table = "parties", related_rust_type = "Party", on_delete = "cascade")]
    #[indexed]
    pub party_id: Option<Uuid>,

    pub created_at: i64,
    pub updated_at: i64,
}
