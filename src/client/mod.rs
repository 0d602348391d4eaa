//! 上流照合サービスとの通信
//!
//! - UploadTransport: セッションから見た送信口（テストでは差し替える）
//! - HttpUploadClient: reqwestによる実装（multipart POST /upload, GET /health）

mod http;

pub use http::HttpUploadClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopper_match_common::{SelectedImage, SubmitOutcome};
use std::collections::BTreeMap;

/// 画像1枚を送信し、結果を返す
///
/// 失敗も含めて [`SubmitOutcome`] で返す。リトライはしない。
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, image: &SelectedImage) -> SubmitOutcome;
}

/// `GET /health` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// APIキー名 → "configured" / "missing"
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
