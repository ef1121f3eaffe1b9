use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use tabletop_database::SqlxObject;

/// A game system (e.g. "D&D 5e"). Parent of parties, item templates and characters.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, SqlxObject)]
#[table_name = "systems"]
pub struct System {
    pub id: Uuid,

    #[unique]
    pub name: String,
    pub description: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl System {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            ..Default::default()
        }
    }
}
