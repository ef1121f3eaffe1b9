use sqlx::types::Uuid;
use sqlx::PgPool;

use crate::audit::{AuditRecorder, ChangeAction, ChangeEntry};
use crate::entities::{Inventory, InventoryItem, ItemTemplate, PlayerCharacter};
use crate::error::{Result, TabletopError};
use crate::mapper::{change_log_to_response, inventory_item_to_response, inventory_to_response};
use crate::repository::Repository;
use crate::wire::{AddItemRequest, InventoryItemChange, InventoryResponse, QuantityChange};

/// Quantity bookkeeping for inventories. Every successful mutation writes
/// exactly one change-log row in the same transaction.
///
/// Quantity changes never delete a stack: depletion leaves the row at zero so
/// its history survives. Only `remove_item` deletes, recorded as `REMOVE_ITEM`.
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Applies `change` to `current`. A decrement past zero stops at zero.
pub fn resolve_quantity(current: i32, change: QuantityChange) -> Result<i32> {
    let next = match change {
        QuantityChange::Delta { delta: 0 } => {
            return Err(TabletopError::validation("delta must not be zero"));
        }
        QuantityChange::Delta { delta } => current
            .checked_add(delta)
            .ok_or_else(|| TabletopError::validation("quantity out of range"))?,
        QuantityChange::Set { quantity } if quantity < 0 => {
            return Err(TabletopError::validation("quantity must not be negative"));
        }
        QuantityChange::Set { quantity } => quantity,
    };
    Ok(next.max(0))
}

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_inventory(&self, id: Uuid) -> Result<InventoryResponse> {
        let mut conn = self.db.acquire().await?;
        let inventory = Repository::<Inventory>::get(&mut conn, id).await?;
        let items = Repository::<InventoryItem>::list_for_inventory(&mut conn, id).await?;
        Ok(inventory_to_response(inventory, items))
    }

    /// Adds `quantity` of a template, stacking onto an existing row.
    #[tracing::instrument(skip(self, req), fields(item_template_id = %req.item_template_id, quantity = req.quantity))]
    pub async fn add_item(
        &self,
        actor: &str,
        inventory_id: Uuid,
        req: AddItemRequest,
    ) -> Result<InventoryItemChange> {
        req.validate()?;

        let mut tx = self.db.begin().await?;
        let inventory = Repository::<Inventory>::get(&mut tx, inventory_id).await?;
        let character = Repository::<PlayerCharacter>::get(&mut tx, inventory.player_character_id).await?;
        let template = Repository::<ItemTemplate>::find(&mut tx, req.item_template_id)
            .await?
            .ok_or_else(|| {
                TabletopError::invalid_reference(format!("item template {} does not exist", req.item_template_id))
            })?;

        if template.system_id != character.system_id {
            return Err(TabletopError::invalid_reference(format!(
                "item template {} belongs to system {}, character {} plays {}",
                template.id, template.system_id, character.id, character.system_id
            )));
        }
        if let Some(party_id) = template.party_id {
            if character.party_id != Some(party_id) {
                return Err(TabletopError::invalid_reference(format!(
                    "item template {} is scoped to party {}",
                    template.id, party_id
                )));
            }
        }

        let item = Repository::<InventoryItem>::upsert_quantity(&mut tx, inventory.id, template.id, req.quantity).await?;
        let log = AuditRecorder::record(
            &mut tx,
            ChangeEntry::new(actor, ChangeAction::AddItem)
                .character(character.id)
                .inventory(inventory.id)
                .item(item.id)
                .describe(format!("Added {} x {} (now {})", req.quantity, template.name, item.quantity)),
        )
        .await?;
        tx.commit().await?;

        Ok(InventoryItemChange {
            action: log.action.clone(),
            item: Some(inventory_item_to_response(item)),
            change_log: change_log_to_response(log),
        })
    }

    pub async fn adjust_item_quantity(&self, actor: &str, item_id: Uuid, delta: i32) -> Result<InventoryItemChange> {
        self.change_quantity(actor, item_id, QuantityChange::Delta { delta }).await
    }

    pub async fn set_item_quantity(&self, actor: &str, item_id: Uuid, quantity: i32) -> Result<InventoryItemChange> {
        self.change_quantity(actor, item_id, QuantityChange::Set { quantity }).await
    }

    /// Locks the item row for the read-modify-write.
    #[tracing::instrument(skip(self))]
    pub async fn change_quantity(
        &self,
        actor: &str,
        item_id: Uuid,
        change: QuantityChange,
    ) -> Result<InventoryItemChange> {
        let mut tx = self.db.begin().await?;
        let mut item = Repository::<InventoryItem>::get_for_update(&mut tx, item_id).await?;
        let inventory = Repository::<Inventory>::get(&mut tx, item.inventory_id).await?;
        let template_name = item
            .fetch_item_template(&mut *tx)
            .await?
            .map(|t| t.name)
            .unwrap_or_default();

        let previous = item.quantity;
        item.quantity = resolve_quantity(previous, change)?;
        let item = Repository::<InventoryItem>::save(&mut tx, item).await?;
        let log = AuditRecorder::record(
            &mut tx,
            ChangeEntry::new(actor, ChangeAction::UpdateItem)
                .character(inventory.player_character_id)
                .inventory(inventory.id)
                .item(item.id)
                .describe(format!("{}: {} -> {}", template_name, previous, item.quantity)),
        )
        .await?;
        tx.commit().await?;

        if item.quantity == 0 {
            tracing::debug!(inventory_item_id = %item.id, "Inventory item depleted");
        }
        Ok(InventoryItemChange {
            action: log.action.clone(),
            item: Some(inventory_item_to_response(item)),
            change_log: change_log_to_response(log),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, actor: &str, item_id: Uuid) -> Result<InventoryItemChange> {
        let mut tx = self.db.begin().await?;
        let item = Repository::<InventoryItem>::get_for_update(&mut tx, item_id).await?;
        let inventory = Repository::<Inventory>::get(&mut tx, item.inventory_id).await?;
        let template_name = item
            .fetch_item_template(&mut *tx)
            .await?
            .map(|t| t.name)
            .unwrap_or_default();

        // Deleting the row cascades its earlier log rows; this one cannot reference it.
        Repository::<InventoryItem>::delete(&mut tx, item.id).await?;
        let log = AuditRecorder::record(
            &mut tx,
            ChangeEntry::new(actor, ChangeAction::RemoveItem)
                .character(inventory.player_character_id)
                .inventory(inventory.id)
                .describe(format!("Removed {} x {}", item.quantity, template_name)),
        )
        .await?;
        tx.commit().await?;

        Ok(InventoryItemChange {
            action: log.action.clone(),
            item: None,
            change_log: change_log_to_response(log),
        })
    }
}
