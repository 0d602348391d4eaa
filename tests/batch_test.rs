//! 一括照合テスト

use async_trait::async_trait;
use serde_json::json;
use shopper_match::batch::{run_batch, BatchReport};
use shopper_match::client::UploadTransport;
use shopper_match::workflow::MatchWorkflow;
use shopper_match_common::{SelectedImage, SessionStatus, SubmitOutcome, UploadResponse, ZeroScorePolicy};
use std::path::PathBuf;
use tempfile::tempdir;

/// ファイル名に "empty" を含む画像だけ結果0件を返す
struct NameAwareTransport;

#[async_trait]
impl UploadTransport for NameAwareTransport {
    async fn upload(&self, image: &SelectedImage) -> SubmitOutcome {
        let results = if image.file_name.contains("empty") {
            json!([])
        } else {
            json!([{"title": format!("Match for {}", image.file_name), "score": 0.9}])
        };
        SubmitOutcome::Completed(UploadResponse::from_value(&json!({
            "success": true,
            "results": results
        })))
    }
}

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];

/// 成功・0件・読み込み失敗が混在してもレポートにまとまる
#[tokio::test]
async fn test_batch_mixed_results() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("a_jacket.jpg"), JPEG_MAGIC).unwrap();
    std::fs::write(dir.path().join("b_empty.jpg"), JPEG_MAGIC).unwrap();

    let images = vec![
        dir.path().join("a_jacket.jpg"),
        dir.path().join("b_empty.jpg"),
        PathBuf::from("/nonexistent/c_missing.jpg"),
    ];

    let mut flow = MatchWorkflow::new(NameAwareTransport, ZeroScorePolicy::Fallback);
    let report = run_batch(&mut flow, &images, "http://127.0.0.1:8000", false).await;

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);

    let first = &report.sessions[0];
    assert_eq!(first.file_name.as_deref(), Some("a_jacket.jpg"));
    assert_eq!(first.status, SessionStatus::Succeeded);
    assert_eq!(first.matches[0].name, "Match for a_jacket.jpg");
    assert_eq!(first.matches[0].similarity, 90);

    let second = &report.sessions[1];
    assert_eq!(second.status, SessionStatus::Failed);
    assert!(second.matches.is_empty());

    let third = &report.sessions[2];
    assert_eq!(third.file_name.as_deref(), Some("c_missing.jpg"));
    assert!(third.error.as_deref().unwrap_or_default().contains("ファイルが見つかりません"));
}

/// 画像でないファイルは送信されず検証エラーになる
#[tokio::test]
async fn test_batch_non_image_content() {
    let dir = tempdir().expect("Failed to create temp dir");
    // 拡張子もマジックバイトも画像でない
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let mut flow = MatchWorkflow::new(NameAwareTransport, ZeroScorePolicy::Fallback);
    let report = run_batch(&mut flow, &[path], "http://127.0.0.1:8000", false).await;

    let session = &report.sessions[0];
    assert_eq!(session.file_name.as_deref(), Some("notes.txt"));
    assert_eq!(session.error.as_deref(), Some("Please select an image file (JPEG, PNG, etc.)"));
}

/// レポートの保存と読み込み
#[tokio::test]
async fn test_batch_report_save() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = dir.path().join("coat.jpg");
    std::fs::write(&image, JPEG_MAGIC).unwrap();

    let mut flow = MatchWorkflow::new(NameAwareTransport, ZeroScorePolicy::Fallback);
    let report = run_batch(&mut flow, &[image], "http://127.0.0.1:8000", false).await;

    let output = dir.path().join("matches.json");
    report.save(&output).expect("save failed");

    let loaded: BatchReport =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(loaded.total, 1);
    assert_eq!(loaded.endpoint, "http://127.0.0.1:8000");
    assert_eq!(loaded.sessions[0].matches[0].id, 1);
}
