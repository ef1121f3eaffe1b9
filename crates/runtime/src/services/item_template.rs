use sqlx::types::Uuid;
use sqlx::PgPool;
use tabletop_database::{OrderDirection, QueryCriteria};

use super::{ensure_party_in_system, ensure_stacks_in_party, ensure_system, DeleteOutcome};
use crate::entities::ItemTemplate;
use crate::error::Result;
use crate::mapper::{apply_item_template_update, item_template_from_request, item_template_to_response};
use crate::repository::Repository;
use crate::wire::{ItemTemplateCreate, ItemTemplateQuery, ItemTemplateResponse, ItemTemplateUpdate};

#[derive(Clone)]
pub struct ItemTemplateService {
    db: PgPool,
}

impl ItemTemplateService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self, req), fields(system_id = %req.system_id, party_id = ?req.party_id))]
    pub async fn add_item_template(&self, req: ItemTemplateCreate) -> Result<ItemTemplateResponse> {
        req.validate()?;

        let mut tx = self.db.begin().await?;
        ensure_system(&mut tx, req.system_id).await?;
        ensure_party_in_system(&mut tx, req.system_id, req.party_id).await?;
        let template = Repository::<ItemTemplate>::create(&mut tx, item_template_from_request(req)).await?;
        tx.commit().await?;

        Ok(item_template_to_response(template))
    }

    pub async fn get_item_template(&self, id: Uuid) -> Result<ItemTemplateResponse> {
        let mut conn = self.db.acquire().await?;
        Repository::<ItemTemplate>::get(&mut conn, id)
            .await
            .map(item_template_to_response)
    }

    pub async fn list_item_templates(&self, query: ItemTemplateQuery) -> Result<Vec<ItemTemplateResponse>> {
        let criteria = QueryCriteria::new()
            .add_optional_eq("system_id", query.system_id)
            .add_optional_eq("party_id", query.party_id)
            .order_by("name", OrderDirection::Asc);

        let mut conn = self.db.acquire().await?;
        let templates = Repository::<ItemTemplate>::list(&mut conn, criteria).await?;
        Ok(templates.into_iter().map(item_template_to_response).collect())
    }

    /// A changed party must still belong to the template's system, and every
    /// character already holding the template must be in it. A mismatch rolls
    /// the update back.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_item_template(&self, id: Uuid, patch: ItemTemplateUpdate) -> Result<ItemTemplateResponse> {
        patch.validate()?;
        let party_changed = patch.party_id.is_some();

        let mut tx = self.db.begin().await?;
        let template =
            Repository::<ItemTemplate>::update(&mut tx, id, |t| apply_item_template_update(t, patch)).await?;
        ensure_party_in_system(&mut tx, template.system_id, template.party_id).await?;
        if party_changed {
            ensure_stacks_in_party(&mut tx, None, Some(template.id)).await?;
        }
        tx.commit().await?;

        Ok(item_template_to_response(template))
    }

    /// Inventory stacks of this template go with it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_item_template(&self, id: Uuid) -> Result<DeleteOutcome> {
        let mut conn = self.db.acquire().await?;
        DeleteOutcome::from_delete(Repository::<ItemTemplate>::delete(&mut conn, id).await)
    }
}
