//! アップロードセッションの状態遷移
//!
//! 1枚の画像を商品カタログと照合する試行を表す値型。
//! 状態は `Idle → ImageSelected → Submitting → {Succeeded, Failed}` と遷移し、
//! 新しい画像の選択はどの状態からでも `ImageSelected` に戻す。
//!
//! セッションは不変値として扱い、[`UploadSession::apply`] が
//! 「旧状態 + イベント → 新状態」を返す。描画面なしで単体テストできる。

use crate::data_url::to_data_url;
use crate::normalizer::{normalize_results, ZeroScorePolicy};
use crate::types::{detail_message, ApisUsed, ProductMatch, UploadResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 画像以外のファイルを選択した場合
pub const INVALID_FILE_MESSAGE: &str = "Please select an image file (JPEG, PNG, etc.)";

/// 成功レスポンスだが結果が0件の場合
pub const NO_RESULTS_MESSAGE: &str = "No similar products found. Try uploading a different image.";

/// 成功フラグが偽で `detail` も無い場合
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process image";

/// セッションステータス
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    ImageSelected,
    Submitting,
    Succeeded,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::ImageSelected => "image_selected",
            SessionStatus::Submitting => "submitting",
            SessionStatus::Succeeded => "succeeded",
            SessionStatus::Failed => "failed",
        }
    }
}

/// ユーザーが選んだファイル（未検証）
#[derive(Debug, Clone, Default)]
pub struct ImageFile {
    pub file_name: String,
    /// MIMEタイプ（例: "image/jpeg"）
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// コンテンツタイプが画像か
    pub fn is_image(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("image/")
    }
}

/// 受理された画像とそのプレビュー
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Data URL形式のプレビュー
    pub preview: String,
}

impl From<ImageFile> for SelectedImage {
    fn from(file: ImageFile) -> Self {
        let preview = to_data_url(&file.content_type, &file.bytes);
        Self {
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
            preview,
        }
    }
}

/// 送信結果（トランスポートからセッションへ渡す）
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// リクエスト自体が完了しなかった（DNS、接続拒否など）
    Transport(String),
    /// 2xx以外のステータス。ボディはJSONとして読めなければ空オブジェクト
    Rejected { status: u16, body: Value },
    /// 2xxでパース済みのボディ
    Completed(UploadResponse),
}

/// セッションイベント
#[derive(Debug, Clone)]
pub enum SessionEvent {
    FileSelected(ImageFile),
    ImageRemoved,
    SubmitRequested,
    SubmitCompleted { submission: u64, outcome: SubmitOutcome },
}

/// アップロードセッション
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    image: Option<SelectedImage>,
    status: SessionStatus,
    raw_caption: Option<String>,
    refined_query: Option<String>,
    matches: Vec<ProductMatch>,
    error: Option<String>,
    apis_used: ApisUsed,
    /// 送信世代。選択・削除・送信開始のたびに進み、古い応答を無効化する
    submission: u64,
    policy: ZeroScorePolicy,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ZeroScorePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// イベントを適用して次の状態を返す
    pub fn apply(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::FileSelected(file) => self.on_file_selected(file),
            SessionEvent::ImageRemoved => self.cleared(None, SessionStatus::Idle),
            SessionEvent::SubmitRequested => self.on_submit_requested(),
            SessionEvent::SubmitCompleted { submission, outcome } => {
                if self.status != SessionStatus::Submitting || submission != self.submission {
                    return self;
                }
                self.on_submit_completed(outcome)
            }
        }
    }

    pub fn select_image(self, file: ImageFile) -> Self {
        self.apply(SessionEvent::FileSelected(file))
    }

    pub fn remove_image(self) -> Self {
        self.apply(SessionEvent::ImageRemoved)
    }

    /// 送信開始。画像が無い場合と送信中の場合は何もしない
    pub fn begin_submit(self) -> Self {
        self.apply(SessionEvent::SubmitRequested)
    }

    pub fn complete_submit(self, submission: u64, outcome: SubmitOutcome) -> Self {
        self.apply(SessionEvent::SubmitCompleted { submission, outcome })
    }

    fn on_file_selected(self, file: ImageFile) -> Self {
        if !file.is_image() {
            return Self {
                status: SessionStatus::Failed,
                error: Some(INVALID_FILE_MESSAGE.to_string()),
                ..self
            };
        }
        self.cleared(Some(file.into()), SessionStatus::ImageSelected)
    }

    fn on_submit_requested(mut self) -> Self {
        if self.image.is_none() || self.status == SessionStatus::Submitting {
            return self;
        }
        let image = self.image.take();
        self.cleared(image, SessionStatus::Submitting)
    }

    fn on_submit_completed(mut self, outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Transport(message) => self.failed(format!("Network error: {}", message)),
            SubmitOutcome::Rejected { status, body } => {
                let message = detail_message(&body)
                    .unwrap_or_else(|| format!("Server error: {}", status));
                self.failed(message)
            }
            SubmitOutcome::Completed(response) if !response.success => {
                let message = response
                    .detail
                    .unwrap_or_else(|| PROCESSING_FAILED_MESSAGE.to_string());
                self.failed(message)
            }
            SubmitOutcome::Completed(response) => {
                self.raw_caption = response.raw_caption;
                self.refined_query = response.refined_query;
                self.apis_used = response.apis_used;

                if response.results.is_empty() {
                    return self.failed(NO_RESULTS_MESSAGE.to_string());
                }

                let preview = self.image.as_ref().map(|i| i.preview.as_str()).unwrap_or_default();
                self.matches = normalize_results(&response.results, preview, self.policy);
                self.error = None;
                self.status = SessionStatus::Succeeded;
                self
            }
        }
    }

    /// 派生状態をすべて消し、送信世代を進める
    fn cleared(self, image: Option<SelectedImage>, status: SessionStatus) -> Self {
        Self {
            image,
            status,
            submission: self.submission + 1,
            policy: self.policy,
            ..Self::default()
        }
    }

    fn failed(mut self, message: String) -> Self {
        self.matches.clear();
        self.error = Some(message);
        self.status = SessionStatus::Failed;
        self
    }

    // =============================================
    // アクセサ
    // =============================================

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn raw_caption(&self) -> Option<&str> {
        self.raw_caption.as_deref()
    }

    pub fn refined_query(&self) -> Option<&str> {
        self.refined_query.as_deref()
    }

    pub fn matches(&self) -> &[ProductMatch] {
        &self.matches
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apis_used(&self) -> &ApisUsed {
        &self.apis_used
    }

    pub fn submission(&self) -> u64 {
        self.submission
    }

    pub fn policy(&self) -> ZeroScorePolicy {
        self.policy
    }

    /// 送信可能か（画像あり・送信中でない）
    pub fn can_submit(&self) -> bool {
        self.image.is_some() && self.status != SessionStatus::Submitting
    }

    /// 画像バイト列を除いたスナップショット
    pub fn report(&self) -> SessionReport {
        SessionReport {
            file_name: self.image.as_ref().map(|i| i.file_name.clone()),
            status: self.status,
            raw_caption: self.raw_caption.clone(),
            refined_query: self.refined_query.clone(),
            apis_used: self.apis_used.clone(),
            matches: self.matches.clone(),
            error: self.error.clone(),
        }
    }
}

/// セッションのJSON出力用スナップショット
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    #[serde(default)]
    pub file_name: Option<String>,
    pub status: SessionStatus,
    #[serde(default)]
    pub raw_caption: Option<String>,
    #[serde(default)]
    pub refined_query: Option<String>,
    #[serde(default)]
    pub apis_used: ApisUsed,
    #[serde(default)]
    pub matches: Vec<ProductMatch>,
    #[serde(default)]
    pub error: Option<String>,
}
