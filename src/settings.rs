use std::env;

use serde::Deserialize;
use tracing::info;

use crate::core::permission::PermissionPolicy;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_env")]
    pub env: String, // file / server
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_prefix")]
    pub prefix: Option<String>,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// token lifetime in minutes
    #[serde(default = "default_jwt_exp")]
    pub jwt_exp: u32,
    #[serde(default)]
    pub permission_policy: PermissionPolicy,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_env() -> String {
    "file".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_prefix() -> Option<String> {
    Some("/api".to_string())
}

fn default_database_url() -> String {
    "sqlite://data.db".to_string()
}

fn default_jwt_secret() -> String {
    "genesis-erp-secret-key-change-in-production".to_string()
}

fn default_jwt_exp() -> u32 {
    // 7 days
    7 * 24 * 60
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_log_level() -> String {
    "debug".to_string()
}

pub fn get_config() -> anyhow::Result<Config> {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
    Ok(envy::from_env::<Config>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_env() {
        let config = envy::from_iter::<_, Config>(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.prefix, Some("/api".to_string()));
        assert_eq!(config.database_url, "sqlite://data.db");
        assert_eq!(config.jwt_exp, 10080);
        assert_eq!(config.permission_policy, PermissionPolicy::Legacy);
    }

    #[test]
    fn test_config_from_env_values() {
        let config = envy::from_iter::<_, Config>(vec![
            ("PORT".to_string(), "8080".to_string()),
            ("JWT_EXP".to_string(), "30".to_string()),
            ("PERMISSION_POLICY".to_string(), "deny".to_string()),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_exp, 30);
        assert_eq!(config.permission_policy, PermissionPolicy::Deny);
    }
}
