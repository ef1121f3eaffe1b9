mod env;
mod global_state;
mod middleware;
mod response;
mod routes;
mod utils;

pub use routes::{
    app_routes,
    change_log_routes,
    inventory_routes,
    item_template_routes,
    misc_routes,
    party_routes,
    player_character_routes,
    system_routes,
};

pub use env::ApiServerEnv;
pub use global_state::GlobalState;
pub use middleware::{authenticate, UserId};
pub use response::{status_for, AppError, GenericResponse};
pub use utils::{extract_bearer_token, setup_tracing};
