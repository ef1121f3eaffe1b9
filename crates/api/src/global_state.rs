use anyhow::Result;
use sqlx::PgPool;
use tabletop_clients::PostgresClient;
use tabletop_common::ModuleClient;
use tabletop_runtime::{
    ChangeLogService, InventoryService, ItemTemplateService, PartyService, PlayerCharacterService,
    SystemService,
};

/// Router state: one pool shared by every service.
#[derive(Clone)]
pub struct GlobalState {
    pub db: PgPool,
    pub systems: SystemService,
    pub parties: PartyService,
    pub item_templates: ItemTemplateService,
    pub player_characters: PlayerCharacterService,
    pub inventories: InventoryService,
    pub change_logs: ChangeLogService,
}

impl GlobalState {
    pub fn new(db: PgPool) -> Self {
        Self {
            systems: SystemService::new(db.clone()),
            parties: PartyService::new(db.clone()),
            item_templates: ItemTemplateService::new(db.clone()),
            player_characters: PlayerCharacterService::new(db.clone()),
            inventories: InventoryService::new(db.clone()),
            change_logs: ChangeLogService::new(db.clone()),
            db,
        }
    }

    /// Connects through `PostgresClient`, creating the schema when `DB_CREATE_TABLES` is set.
    pub async fn connect() -> Result<Self> {
        let client = PostgresClient::setup_connection().await?;
        let pool: &PgPool = client.get_client();
        Ok(Self::new(pool.clone()))
    }
}
