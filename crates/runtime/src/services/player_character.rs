use sqlx::types::Uuid;
use sqlx::PgPool;
use tabletop_database::{OrderDirection, QueryCriteria};

use super::{ensure_party_in_system, ensure_stacks_in_party, ensure_system, DeleteOutcome};
use crate::entities::{Inventory, InventoryItem, PlayerCharacter};
use crate::error::{Result, TabletopError};
use crate::mapper::{
    apply_player_character_update, inventory_to_response, player_character_from_request,
    player_character_to_response,
};
use crate::repository::Repository;
use crate::wire::{
    CreatedPlayerCharacter, InventoryResponse, PlayerCharacterCreate, PlayerCharacterQuery,
    PlayerCharacterResponse, PlayerCharacterUpdate,
};

#[derive(Clone)]
pub struct PlayerCharacterService {
    db: PgPool,
}

impl PlayerCharacterService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Creates the character and its empty inventory in one transaction.
    #[tracing::instrument(skip(self, req), fields(system_id = %req.system_id))]
    pub async fn create_player_character(
        &self,
        user_id: &str,
        req: PlayerCharacterCreate,
    ) -> Result<CreatedPlayerCharacter> {
        req.validate()?;
        if user_id.trim().is_empty() {
            return Err(TabletopError::validation("player character requires an owner"));
        }

        let mut tx = self.db.begin().await?;
        ensure_system(&mut tx, req.system_id).await?;
        ensure_party_in_system(&mut tx, req.system_id, req.party_id).await?;

        let character =
            Repository::<PlayerCharacter>::create(&mut tx, player_character_from_request(user_id, req)).await?;
        let inventory = Repository::<Inventory>::create(&mut tx, Inventory::for_character(character.id)).await?;
        tx.commit().await?;

        tracing::info!(player_character_id = %character.id, inventory_id = %inventory.id, "Player character created");
        Ok(CreatedPlayerCharacter {
            character: player_character_to_response(character),
            inventory: inventory_to_response(inventory, Vec::new()),
        })
    }

    pub async fn get_player_character(&self, id: Uuid) -> Result<PlayerCharacterResponse> {
        let mut conn = self.db.acquire().await?;
        Repository::<PlayerCharacter>::get(&mut conn, id)
            .await
            .map(player_character_to_response)
    }

    pub async fn list_player_characters(&self, query: PlayerCharacterQuery) -> Result<Vec<PlayerCharacterResponse>> {
        let criteria = QueryCriteria::new()
            .add_optional_eq("user_id", query.user_id)
            .add_optional_eq("system_id", query.system_id)
            .add_optional_eq("party_id", query.party_id)
            .order_by("created_at", OrderDirection::Asc);

        let mut conn = self.db.acquire().await?;
        let characters = Repository::<PlayerCharacter>::list(&mut conn, criteria).await?;
        Ok(characters.into_iter().map(player_character_to_response).collect())
    }

    /// Leaving a party is refused while the inventory holds that party's items.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_player_character(
        &self,
        id: Uuid,
        patch: PlayerCharacterUpdate,
    ) -> Result<PlayerCharacterResponse> {
        patch.validate()?;
        let party_changed = patch.party_id.is_some();

        let mut tx = self.db.begin().await?;
        let character =
            Repository::<PlayerCharacter>::update(&mut tx, id, |c| apply_player_character_update(c, patch)).await?;
        ensure_party_in_system(&mut tx, character.system_id, character.party_id).await?;
        if party_changed {
            ensure_stacks_in_party(&mut tx, Some(character.id), None).await?;
        }
        tx.commit().await?;

        Ok(player_character_to_response(character))
    }

    /// The inventory, its items and the character's change log go with it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_player_character(&self, id: Uuid) -> Result<DeleteOutcome> {
        let mut conn = self.db.acquire().await?;
        DeleteOutcome::from_delete(Repository::<PlayerCharacter>::delete(&mut conn, id).await)
    }

    pub async fn get_inventory_for(&self, player_character_id: Uuid) -> Result<InventoryResponse> {
        let mut conn = self.db.acquire().await?;
        let inventory = match Repository::<Inventory>::find_by_character(&mut conn, player_character_id).await? {
            Some(inventory) => inventory,
            None => {
                // Distinguish a missing character from a broken pairing.
                Repository::<PlayerCharacter>::get(&mut conn, player_character_id).await?;
                return Err(TabletopError::Internal(format!(
                    "player character {} has no inventory",
                    player_character_id
                )));
            }
        };
        let items = Repository::<InventoryItem>::list_for_inventory(&mut conn, inventory.id).await?;
        Ok(inventory_to_response(inventory, items))
    }
}
