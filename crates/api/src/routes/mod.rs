mod change_log;
mod inventory;
mod item_template;
mod misc;
mod party;
mod player_character;
mod system;

pub use change_log::change_log_routes;
pub use inventory::inventory_routes;
pub use item_template::item_template_routes;
pub use misc::misc_routes;
pub use party::party_routes;
pub use player_character::player_character_routes;
pub use system::system_routes;

use axum::Router;

use crate::GlobalState;

/// Every route of the service, without the outer tower layers.
pub fn app_routes() -> Router<GlobalState> {
    Router::new()
        .merge(misc_routes())
        .merge(system_routes())
        .merge(party_routes())
        .merge(item_template_routes())
        .merge(player_character_routes())
        .merge(inventory_routes())
        .merge(change_log_routes())
}
