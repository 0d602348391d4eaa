use crate::error::{Result, ShopperMatchError};
use serde::{Deserialize, Serialize};
use shopper_match_common::ZeroScorePolicy;
use std::path::{Path, PathBuf};

/// 上流エンドポイントを上書きする環境変数
pub const ENDPOINT_ENV: &str = "SHOPPER_MATCH_ENDPOINT";

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 上流サービスのベースURL（`/upload` と `/health` を持つ）
    pub endpoint: String,
    /// リクエストタイムアウト。未設定ならタイムアウトなし
    pub timeout_seconds: Option<u64>,
    pub zero_score: ZeroScorePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_seconds: None,
            zero_score: ZeroScorePolicy::default(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数の上書きを適用
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_env_override())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ShopperMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("shopper-match").join("config.json"))
    }

    /// 環境変数を優先
    pub fn with_env_override(mut self) -> Self {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint.trim().to_string();
            }
        }
        self
    }

    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        let endpoint = endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ShopperMatchError::Config(format!(
                "エンドポイントは http:// または https:// で始まる必要があります: {}",
                endpoint
            )));
        }
        self.endpoint = endpoint.to_string();
        Ok(())
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.endpoint.trim_end_matches('/'))
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.endpoint.trim_end_matches('/'))
    }
}
