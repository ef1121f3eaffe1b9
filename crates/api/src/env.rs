use anyhow::Result;
use tabletop_common::{env_parse, EnvVars};

#[derive(Debug, Clone)]
pub struct ApiServerEnv {
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl EnvVars for ApiServerEnv {
    fn load() -> Result<Self> {
        Ok(Self {
            port: env_parse("PORT", 3033)?,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30)?,
        })
    }

    fn get_env_var(&self, key: &str) -> Option<String> {
        match key {
            "PORT" => Some(self.port.to_string()),
            "REQUEST_TIMEOUT_SECS" => Some(self.request_timeout_secs.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        std::env::remove_var("PORT");
        std::env::remove_var("REQUEST_TIMEOUT_SECS");
        let env = ApiServerEnv::load().unwrap();
        assert_eq!(env.port, 3033);
        assert_eq!(env.get_env_var("REQUEST_TIMEOUT_SECS").as_deref(), Some("30"));
        assert!(env.get_env_var("SECRET").is_none());
    }
}
