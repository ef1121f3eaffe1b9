use sqlx::types::Uuid;
use sqlx::PgPool;
use tabletop_database::{OrderDirection, QueryCriteria};

use crate::entities::ChangeLog;
use crate::error::Result;
use crate::mapper::change_log_to_response;
use crate::repository::Repository;
use crate::wire::{ChangeLogQuery, ChangeLogResponse};

const DEFAULT_PAGE: i64 = 100;
const MAX_PAGE: i64 = 500;

/// Read-only access to the audit trail, newest first.
#[derive(Clone)]
pub struct ChangeLogService {
    db: PgPool,
}

impl ChangeLogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_change_log(&self, id: Uuid) -> Result<ChangeLogResponse> {
        let mut conn = self.db.acquire().await?;
        Repository::<ChangeLog>::get(&mut conn, id)
            .await
            .map(change_log_to_response)
    }

    pub async fn list_change_logs(&self, query: ChangeLogQuery) -> Result<Vec<ChangeLogResponse>> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
        let offset = query.offset.unwrap_or(0).max(0);

        let criteria = QueryCriteria::new()
            .add_optional_eq("user_id", query.user_id)
            .add_optional_eq("player_character_id", query.player_character_id)
            .add_optional_eq("inventory_id", query.inventory_id)
            .add_optional_eq("inventory_item_id", query.inventory_item_id)
            .order_by("created_at", OrderDirection::Desc)
            .limit(limit)
            .offset(offset);

        let mut conn = self.db.acquire().await?;
        let logs = Repository::<ChangeLog>::list(&mut conn, criteria).await?;
        Ok(logs.into_iter().map(change_log_to_response).collect())
    }
}
