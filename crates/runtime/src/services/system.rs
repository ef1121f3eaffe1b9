use sqlx::types::Uuid;
use sqlx::PgPool;

use super::DeleteOutcome;
use crate::entities::System;
use crate::error::{Result, TabletopError};
use crate::mapper::{apply_system_update, system_from_request, system_to_response};
use crate::repository::Repository;
use crate::wire::{SystemCreate, SystemResponse, SystemUpdate};
use tabletop_database::{OrderDirection, QueryCriteria};

#[derive(Clone)]
pub struct SystemService {
    db: PgPool,
}

fn name_taken(name: &str, err: TabletopError) -> TabletopError {
    match err {
        TabletopError::Conflict(_) => {
            TabletopError::Conflict(format!("a system named '{}' already exists", name))
        }
        other => other,
    }
}

impl SystemService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self, req), fields(name = %req.name))]
    pub async fn add_system(&self, req: SystemCreate) -> Result<SystemResponse> {
        req.validate()?;
        let name = req.name.clone();

        let mut conn = self.db.acquire().await?;
        let system = Repository::<System>::create(&mut conn, system_from_request(req))
            .await
            .map_err(|e| name_taken(&name, e))?;

        tracing::info!(system_id = %system.id, "System created");
        Ok(system_to_response(system))
    }

    pub async fn get_system(&self, id: Uuid) -> Result<SystemResponse> {
        let mut conn = self.db.acquire().await?;
        Repository::<System>::get(&mut conn, id).await.map(system_to_response)
    }

    pub async fn list_systems(&self) -> Result<Vec<SystemResponse>> {
        let mut conn = self.db.acquire().await?;
        let systems = Repository::<System>::list(
            &mut conn,
            QueryCriteria::new().order_by("name", OrderDirection::Asc),
        )
        .await?;
        Ok(systems.into_iter().map(system_to_response).collect())
    }

    pub async fn search_systems(&self, name_fragment: &str) -> Result<Vec<SystemResponse>> {
        let mut conn = self.db.acquire().await?;
        let systems = Repository::<System>::search_by_name(&mut conn, name_fragment).await?;
        Ok(systems.into_iter().map(system_to_response).collect())
    }

    pub async fn find_system_by_name(&self, name: &str) -> Result<SystemResponse> {
        let mut conn = self.db.acquire().await?;
        Repository::<System>::find_by_name(&mut conn, name)
            .await?
            .map(system_to_response)
            .ok_or_else(|| TabletopError::not_found("System", name))
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update_system(&self, id: Uuid, patch: SystemUpdate) -> Result<SystemResponse> {
        patch.validate()?;
        let new_name = patch.name.clone();

        let mut tx = self.db.begin().await?;
        let system = Repository::<System>::update(&mut tx, id, |s| apply_system_update(s, patch))
            .await
            .map_err(|e| match &new_name {
                Some(name) => name_taken(name, e),
                None => e,
            })?;
        tx.commit().await?;

        Ok(system_to_response(system))
    }

    /// Parties, item templates and characters of the system go with it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_system(&self, id: Uuid) -> Result<DeleteOutcome> {
        let mut conn = self.db.acquire().await?;
        let outcome = DeleteOutcome::from_delete(Repository::<System>::delete(&mut conn, id).await)?;
        tracing::info!(?outcome, "System delete");
        Ok(outcome)
    }
}
