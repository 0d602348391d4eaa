//! 照合ワークフローテスト
//!
//! 差し替えた送信口でセッションの遷移を端から端まで検証

use async_trait::async_trait;
use serde_json::json;
use shopper_match::client::UploadTransport;
use shopper_match::workflow::MatchWorkflow;
use shopper_match_common::{
    ImageFile, SelectedImage, SessionStatus, SubmitOutcome, UploadResponse, ZeroScorePolicy,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 固定の結果を返す送信口
struct FakeTransport {
    outcome: SubmitOutcome,
    calls: Arc<AtomicUsize>,
}

impl FakeTransport {
    fn new(outcome: SubmitOutcome) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { outcome, calls: calls.clone() }, calls)
    }

    fn completed(body: serde_json::Value) -> (Self, Arc<AtomicUsize>) {
        Self::new(SubmitOutcome::Completed(UploadResponse::from_value(&body)))
    }
}

#[async_trait]
impl UploadTransport for FakeTransport {
    async fn upload(&self, _image: &SelectedImage) -> SubmitOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn jacket() -> ImageFile {
    ImageFile::new("jacket.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

/// 画像以外を選択すると検証エラー
#[tokio::test]
async fn test_non_image_selection() {
    let (transport, calls) = FakeTransport::completed(json!({"success": true}));
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);

    flow.select_image(ImageFile::new("notes.txt", "text/plain", b"hello".to_vec()));
    assert_eq!(flow.session().status(), SessionStatus::Failed);
    assert_eq!(flow.session().error(), Some("Please select an image file (JPEG, PNG, etc.)"));
    assert!(flow.session().image().is_none());

    // 画像が無いので送信しない
    flow.submit().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// 選択直後に削除するとIdleに戻る
#[tokio::test]
async fn test_select_then_remove() {
    let (transport, _) = FakeTransport::completed(json!({"success": true}));
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);

    flow.select_image(jacket());
    let session = flow.remove_image();

    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(session.image().is_none());
    assert!(session.matches().is_empty());
    assert!(session.error().is_none());
    assert!(session.raw_caption().is_none());
    assert!(session.refined_query().is_none());
}

/// 成功レスポンスの正規化
#[tokio::test]
async fn test_submit_success() {
    let (transport, calls) = FakeTransport::completed(json!({
        "success": true,
        "raw_caption": "a blue denim jacket",
        "refined_query": "blue denim jacket",
        "processing_info": {"apis_used": {"blip": true, "gemini": true, "tavily": true}},
        "results": [{"title": "Blue Jacket", "score": 0.73}]
    }));
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);

    flow.select_image(jacket());
    let preview = flow.session().image().unwrap().preview.clone();
    let session = flow.submit().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.status(), SessionStatus::Succeeded);
    assert_eq!(session.raw_caption(), Some("a blue denim jacket"));

    let product = &session.matches()[0];
    assert_eq!(product.id, 1);
    assert_eq!(product.name, "Blue Jacket");
    assert_eq!(product.similarity, 73);
    assert_eq!(product.image, preview);
    assert_eq!(product.link, "#");
    assert_eq!(product.price, "");
    assert_eq!(product.snippet, "");
}

/// 結果0件
#[tokio::test]
async fn test_submit_empty_results() {
    let (transport, _) = FakeTransport::completed(json!({"success": true, "results": []}));
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);

    flow.select_image(jacket());
    let session = flow.submit().await;

    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(
        session.error(),
        Some("No similar products found. Try uploading a different image.")
    );
}

/// HTTP 500 + detail
#[tokio::test]
async fn test_submit_server_error() {
    let (transport, _) = FakeTransport::new(SubmitOutcome::Rejected {
        status: 500,
        body: json!({"detail": "model unavailable"}),
    });
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);

    flow.select_image(jacket());
    let session = flow.submit().await;

    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.error(), Some("model unavailable"));
}

/// 通信失敗
#[tokio::test]
async fn test_submit_transport_error() {
    let (transport, _) = FakeTransport::new(SubmitOutcome::Transport("timeout".to_string()));
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);

    flow.select_image(jacket());
    let session = flow.submit().await;

    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.error(), Some("Network error: timeout"));
}

/// スコア0はポリシー次第
#[tokio::test]
async fn test_zero_score_policies() {
    let body = json!({"success": true, "results": [{"score": 0}]});

    let (transport, _) = FakeTransport::completed(body.clone());
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);
    flow.select_image(jacket());
    assert_eq!(flow.submit().await.matches()[0].similarity, 80);

    let (transport, _) = FakeTransport::completed(body);
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::KeepZero);
    flow.select_image(jacket());
    assert_eq!(flow.submit().await.matches()[0].similarity, 0);
}

/// 失敗後の再送信
#[tokio::test]
async fn test_resubmit_after_failure() {
    let (transport, calls) = FakeTransport::new(SubmitOutcome::Transport("refused".to_string()));
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::Fallback);

    flow.select_image(jacket());
    flow.submit().await;
    flow.submit().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(flow.session().error(), Some("Network error: refused"));
}

/// resetでポリシーを保ったまま空のセッションになる
#[tokio::test]
async fn test_reset_keeps_policy() {
    let (transport, _) = FakeTransport::completed(json!({"success": true}));
    let mut flow = MatchWorkflow::new(transport, ZeroScorePolicy::KeepZero);

    flow.select_image(jacket());
    flow.reset();

    assert_eq!(flow.session().status(), SessionStatus::Idle);
    assert_eq!(flow.session().policy(), ZeroScorePolicy::KeepZero);
    assert!(flow.into_session().image().is_none());
}
