use super::{HealthStatus, UploadTransport};
use crate::config::Config;
use crate::error::{Result, ShopperMatchError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use shopper_match_common::{SelectedImage, SubmitOutcome, UploadResponse};
use std::time::Duration;

/// multipartのフィールド名
const FILE_FIELD: &str = "file";

/// reqwestによる上流クライアント
#[derive(Debug, Clone)]
pub struct HttpUploadClient {
    client: reqwest::Client,
    upload_url: String,
    health_url: String,
}

impl HttpUploadClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            upload_url: config.upload_url(),
            health_url: config.health_url(),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// ヘルスチェック
    pub async fn health(&self) -> Result<HealthStatus> {
        tracing::debug!(url = %self.health_url, "checking upstream health");
        let response = self.client.get(&self.health_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopperMatchError::Upstream(format!(
                "ヘルスチェック失敗: ステータス {}",
                status.as_u16()
            )));
        }

        Ok(response.json::<HealthStatus>().await?)
    }

    async fn send(&self, image: &SelectedImage) -> std::result::Result<SubmitOutcome, reqwest::Error> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self.client.post(&self.upload_url).multipart(form).send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "upload response received");

        if status.is_success() {
            let text = response.text().await?;
            return Ok(match UploadResponse::parse(&text) {
                Ok(parsed) => SubmitOutcome::Completed(parsed),
                // 2xxでもボディが読めなければ通信失敗と同じ扱い
                Err(e) => SubmitOutcome::Transport(e.to_string()),
            });
        }

        // エラーボディは読めなくても空オブジェクトとして扱う
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| Value::Object(Default::default()));
        Ok(SubmitOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl UploadTransport for HttpUploadClient {
    async fn upload(&self, image: &SelectedImage) -> SubmitOutcome {
        tracing::info!(
            url = %self.upload_url,
            file = %image.file_name,
            bytes = image.bytes.len(),
            "sending image to upstream"
        );

        match self.send(image).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = error_chain(&e);
                tracing::warn!(error = %message, "upload request failed");
                SubmitOutcome::Transport(message)
            }
        }
    }
}

/// reqwestのエラーは原因がsourceに入るので連結して返す
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
