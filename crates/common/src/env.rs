use anyhow::{anyhow, Result};

pub trait EnvVars: Sized {
    fn load() -> Result<Self>;
    fn get_env_var(&self, key: &str) -> Option<String>;
}

/// Reads `key`, falling back to `default` when unset or empty.
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

pub fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value for {}: {}", key, e)),
        _ => Ok(default),
    }
}

/// Accepts `1/true/yes/on` and `0/false/no/off`, case-insensitively.
pub fn env_flag(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow!("invalid boolean for {}: {}", key, other)),
        },
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_missing_and_blank() {
        std::env::remove_var("TABLETOP_TEST_ENV_OR");
        assert_eq!(env_or("TABLETOP_TEST_ENV_OR", "fallback"), "fallback");

        std::env::set_var("TABLETOP_TEST_ENV_OR", "   ");
        assert_eq!(env_or("TABLETOP_TEST_ENV_OR", "fallback"), "fallback");

        std::env::set_var("TABLETOP_TEST_ENV_OR", "value");
        assert_eq!(env_or("TABLETOP_TEST_ENV_OR", "fallback"), "value");
    }

    #[test]
    fn env_parse_reports_bad_numbers() {
        std::env::set_var("TABLETOP_TEST_ENV_PARSE", "not-a-number");
        assert!(env_parse::<u32>("TABLETOP_TEST_ENV_PARSE", 1).is_err());

        std::env::set_var("TABLETOP_TEST_ENV_PARSE", " 42 ");
        assert_eq!(env_parse::<u32>("TABLETOP_TEST_ENV_PARSE", 1).unwrap(), 42);

        std::env::remove_var("TABLETOP_TEST_ENV_PARSE");
        assert_eq!(env_parse::<u32>("TABLETOP_TEST_ENV_PARSE", 7).unwrap(), 7);
    }

    #[test]
    fn env_flag_parses_common_spellings() {
        std::env::set_var("TABLETOP_TEST_ENV_FLAG", "Yes");
        assert!(env_flag("TABLETOP_TEST_ENV_FLAG", false).unwrap());

        std::env::set_var("TABLETOP_TEST_ENV_FLAG", "off");
        assert!(!env_flag("TABLETOP_TEST_ENV_FLAG", true).unwrap());

        std::env::set_var("TABLETOP_TEST_ENV_FLAG", "maybe");
        assert!(env_flag("TABLETOP_TEST_ENV_FLAG", true).is_err());
    }
}
