use sqlx::types::Uuid;
use sqlx::PgPool;
use tabletop_database::{OrderDirection, QueryCriteria};

use super::{ensure_system, DeleteOutcome};
use crate::entities::Party;
use crate::error::Result;
use crate::mapper::{apply_party_update, party_from_request, party_to_response};
use crate::repository::Repository;
use crate::wire::{PartyCreate, PartyResponse, PartyUpdate};

#[derive(Clone)]
pub struct PartyService {
    db: PgPool,
}

impl PartyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self, req), fields(system_id = %req.system_id))]
    pub async fn add_party(&self, req: PartyCreate) -> Result<PartyResponse> {
        req.validate()?;

        let mut tx = self.db.begin().await?;
        ensure_system(&mut tx, req.system_id).await?;
        let party = Repository::<Party>::create(&mut tx, party_from_request(req)).await?;
        tx.commit().await?;

        Ok(party_to_response(party))
    }

    pub async fn get_party(&self, id: Uuid) -> Result<PartyResponse> {
        let mut conn = self.db.acquire().await?;
        Repository::<Party>::get(&mut conn, id).await.map(party_to_response)
    }

    pub async fn list_parties(&self, system_id: Option<Uuid>) -> Result<Vec<PartyResponse>> {
        let criteria = QueryCriteria::new()
            .add_optional_eq("system_id", system_id)
            .order_by("created_at", OrderDirection::Asc);

        let mut conn = self.db.acquire().await?;
        let parties = Repository::<Party>::list(&mut conn, criteria).await?;
        Ok(parties.into_iter().map(party_to_response).collect())
    }

    pub async fn update_party(&self, id: Uuid, patch: PartyUpdate) -> Result<PartyResponse> {
        patch.validate()?;

        let mut tx = self.db.begin().await?;
        let party = Repository::<Party>::update(&mut tx, id, |p| apply_party_update(p, patch)).await?;
        tx.commit().await?;

        Ok(party_to_response(party))
    }

    /// Member characters and party-scoped item templates go with it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_party(&self, id: Uuid) -> Result<DeleteOutcome> {
        let mut conn = self.db.acquire().await?;
        DeleteOutcome::from_delete(Repository::<Party>::delete(&mut conn, id).await)
    }
}
