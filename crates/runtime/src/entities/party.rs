use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use tabletop_database::SqlxObject;

use super::System;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, SqlxObject)]
#[table_name = "parties"]
pub struct Party {
    pub id: Uuid,

    pub name: String,
    pub description: Option<String>,

    #[foreign_key(referenced_table = "systems", related_rust_type = "System", on_delete = "cascade")]
    #[indexed]
    pub system_id: Uuid,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Party {
    pub fn new(system_id: Uuid, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            system_id,
            ..Default::default()
        }
    }
}
