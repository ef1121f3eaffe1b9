mod change_log;
mod inventory;
mod item_template;
mod party;
mod player_character;
mod system;

pub use change_log::ChangeLogService;
pub use inventory::{resolve_quantity, InventoryService};
pub use item_template::ItemTemplateService;
pub use party::PartyService;
pub use player_character::PlayerCharacterService;
pub use system::SystemService;

use sqlx::types::Uuid;
use sqlx::PgConnection;

use crate::entities::{InventoryItem, Party, System};
use crate::error::{Result, TabletopError};
use crate::repository::Repository;

/// Result of an idempotent delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

impl DeleteOutcome {
    /// Folds a repository `NotFound` into `AlreadyAbsent`; every other error propagates.
    pub fn from_delete(result: Result<()>) -> Result<Self> {
        match result {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.is_not_found() => Ok(DeleteOutcome::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }

    pub fn was_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

pub(crate) async fn ensure_system(conn: &mut PgConnection, system_id: Uuid) -> Result<System> {
    Repository::<System>::find(conn, system_id)
        .await?
        .ok_or_else(|| TabletopError::invalid_reference(format!("system {} does not exist", system_id)))
}

/// A party reference must point at an existing party of the same system.
pub(crate) async fn ensure_party_in_system(
    conn: &mut PgConnection,
    system_id: Uuid,
    party_id: Option<Uuid>,
) -> Result<Option<Party>> {
    let Some(party_id) = party_id else {
        return Ok(None);
    };
    let party = Repository::<Party>::find(conn, party_id)
        .await?
        .ok_or_else(|| TabletopError::invalid_reference(format!("party {} does not exist", party_id)))?;
    if party.system_id != system_id {
        return Err(TabletopError::invalid_reference(format!(
            "party {} belongs to system {}, not {}",
            party_id, party.system_id, system_id
        )));
    }
    Ok(Some(party))
}

/// Existing inventory stacks must keep satisfying party-scoped templates
/// after a character or template changes party.
pub(crate) async fn ensure_stacks_in_party(
    conn: &mut PgConnection,
    player_character_id: Option<Uuid>,
    item_template_id: Option<Uuid>,
) -> Result<()> {
    match Repository::<InventoryItem>::find_out_of_party(conn, player_character_id, item_template_id).await? {
        Some(item_id) => Err(TabletopError::invalid_reference(format!(
            "inventory item {} would hold a template scoped to another party",
            item_id
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_outcome_folds_not_found_only() {
        assert_eq!(DeleteOutcome::from_delete(Ok(())).unwrap(), DeleteOutcome::Deleted);
        assert_eq!(
            DeleteOutcome::from_delete(Err(TabletopError::not_found("Party", "x"))).unwrap(),
            DeleteOutcome::AlreadyAbsent
        );
        assert!(DeleteOutcome::from_delete(Err(TabletopError::Transient("pool".into()))).is_err());
        assert!(DeleteOutcome::Deleted.was_deleted());
        assert!(!DeleteOutcome::AlreadyAbsent.was_deleted());
    }
}
