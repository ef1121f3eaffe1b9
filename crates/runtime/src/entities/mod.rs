mod change_log;
mod inventory;
mod inventory_item;
mod item_template;
mod party;
mod player_character;
mod system;

pub use change_log::ChangeLog;
pub use inventory::Inventory;
pub use inventory_item::InventoryItem;
pub use item_template::ItemTemplate;
pub use party::Party;
pub use player_character::PlayerCharacter;
pub use system::System;
