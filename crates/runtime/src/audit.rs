use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use sqlx::PgConnection;
use strum_macros::{Display, EnumString};

use crate::entities::ChangeLog;
use crate::error::{Result, TabletopError};
use crate::repository::Repository;

/// Action codes written by the inventory service. The column itself is free-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    AddItem,
    UpdateItem,
    RemoveItem,
}

#[derive(Debug, Clone, Default)]
pub struct ChangeEntry {
    pub user_id: String,
    pub action: String,
    pub description: Option<String>,
    pub player_character_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub inventory_item_id: Option<Uuid>,
}

impl ChangeEntry {
    pub fn new(user_id: impl Into<String>, action: impl ToString) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.to_string(),
            ..Default::default()
        }
    }

    pub fn character(mut self, player_character_id: Uuid) -> Self {
        self.player_character_id = Some(player_character_id);
        self
    }

    pub fn inventory(mut self, inventory_id: Uuid) -> Self {
        self.inventory_id = Some(inventory_id);
        self
    }

    pub fn item(mut self, inventory_item_id: Uuid) -> Self {
        self.inventory_item_id = Some(inventory_item_id);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(TabletopError::validation("change log requires an actor id"));
        }
        if self.action.trim().is_empty() {
            return Err(TabletopError::validation("change log requires an action"));
        }
        Ok(())
    }
}

/// Appends change-log rows inside the caller's transaction, so a failed
/// append rolls back the mutation it documents.
pub struct AuditRecorder;

impl AuditRecorder {
    #[tracing::instrument(skip_all, fields(action = %entry.action, user_id = %entry.user_id))]
    pub async fn record(conn: &mut PgConnection, entry: ChangeEntry) -> Result<ChangeLog> {
        entry.validate()?;

        let log = ChangeLog {
            user_id: entry.user_id,
            action: entry.action,
            description: entry.description,
            player_character_id: entry.player_character_id,
            inventory_id: entry.inventory_id,
            inventory_item_id: entry.inventory_item_id,
            ..Default::default()
        };
        Repository::<ChangeLog>::create(conn, log).await
    }
}
