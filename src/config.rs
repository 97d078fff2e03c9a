use crate::error::{DocuStructError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DocuStructError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("docustruct").join("config.json"))
    }

    /// APIキーを解決（環境変数 > 設定ファイル）
    ///
    /// `.env` があれば先に読み込む。
    pub fn get_api_key(&self) -> Result<String> {
        dotenvy::dotenv().ok();
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
            .ok_or(DocuStructError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_ok()
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key.trim().to_string());
        self.save()
    }

    pub fn set_model(&mut self, model: String) -> Result<()> {
        self.model = model.trim().to_string();
        self.save()
    }
}

/// 空文字のキーは未設定として扱う
fn resolve_api_key(env_value: Option<String>, configured: Option<&str>) -> Option<String> {
    env_value
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .or_else(|| {
            configured
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
}
