mod client;
mod env;

pub use client::ModuleClient;
pub use env::{env_flag, env_or, env_parse, EnvVars};
