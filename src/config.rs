use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_DATA_FILE: &str = "data/db.json";
pub const DEFAULT_PASSWORD: &str = "123456";

// Service configuration sourced from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterConfig {
    pub bind_addr: SocketAddr,
    pub data_file: PathBuf,
    pub default_password: String,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RosterConfigOverride {
    bind_addr: Option<String>,
    data_file: Option<String>,
    default_password: Option<String>,
    log_dir: Option<String>,
}

impl RosterConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("ESCALA_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read ESCALA_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("ESCALA_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse ESCALA_BIND")?;
        let data_file = lookup("ESCALA_DATA_FILE")
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
            .into();
        let default_password =
            lookup("ESCALA_DEFAULT_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
        let log_dir = lookup("ESCALA_LOG_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            bind_addr,
            data_file,
            default_password,
            log_dir,
        })
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: RosterConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse roster config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.data_file {
            self.data_file = value.into();
        }
        if let Some(value) = override_cfg.default_password {
            self.default_password = value;
        }
        if let Some(value) = override_cfg.log_dir {
            self.log_dir = Some(value.into());
        }
        Ok(())
    }
}
