use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopperMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("上流サービスエラー: {0}")]
    Upstream(String),

    #[error("照合失敗: {0}")]
    MatchFailed(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] shopper_match_common::Error),
}

pub type Result<T> = std::result::Result<T, ShopperMatchError>;
