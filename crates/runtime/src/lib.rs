mod audit;
mod entities;
mod error;
mod mapper;
mod repository;
mod services;
pub mod wire;

pub use audit::{AuditRecorder, ChangeAction, ChangeEntry};
pub use entities::{ChangeLog, Inventory, InventoryItem, ItemTemplate, Party, PlayerCharacter, System};
pub use error::{Result, TabletopError};
pub use mapper::*;
pub use repository::{like_pattern, EntityName, Repository};
pub use services::{
    resolve_quantity, ChangeLogService, DeleteOutcome, InventoryService, ItemTemplateService,
    PartyService, PlayerCharacterService, SystemService,
};
