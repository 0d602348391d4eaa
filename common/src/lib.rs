//! Shopper Match Common Library
//!
//! CLIとバッチ処理で共有される型と状態遷移ロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod data_url;
pub mod normalizer;
pub mod session;

pub use types::{ApisUsed, ProductMatch, UploadResponse};
pub use error::{Error, Result};
pub use data_url::to_data_url;
pub use normalizer::{normalize_results, ZeroScorePolicy, DEFAULT_SIMILARITY};
pub use session::{
    ImageFile, SelectedImage, SessionEvent, SessionReport, SessionStatus, SubmitOutcome,
    UploadSession,
};
