//! セッションと送信口をつなぐ照合ワークフロー

use crate::client::UploadTransport;
use shopper_match_common::{
    ImageFile, SessionEvent, SessionStatus, SubmitOutcome, UploadSession, ZeroScorePolicy,
};

/// 1つのセッションと1つの送信口を所有する
///
/// `submit` は `&mut self` を取るため、同じワークフロー上で送信が重なることはない。
pub struct MatchWorkflow<T: UploadTransport> {
    transport: T,
    session: UploadSession,
}

impl<T: UploadTransport> MatchWorkflow<T> {
    pub fn new(transport: T, policy: ZeroScorePolicy) -> Self {
        Self {
            transport,
            session: UploadSession::with_policy(policy),
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn into_session(self) -> UploadSession {
        self.session
    }

    /// 新しい空のセッションに差し替える（ポリシーは維持）
    pub fn reset(&mut self) {
        self.session = UploadSession::with_policy(self.session.policy());
    }

    pub fn select_image(&mut self, file: ImageFile) -> &UploadSession {
        let file_name = file.file_name.clone();
        self.transition(SessionEvent::FileSelected(file));

        if self.session.status() == SessionStatus::Failed {
            tracing::warn!(file = %file_name, "rejected non-image file");
        } else {
            tracing::debug!(file = %file_name, "image selected");
        }
        &self.session
    }

    pub fn remove_image(&mut self) -> &UploadSession {
        self.transition(SessionEvent::ImageRemoved)
    }

    /// 選択中の画像を送信し、結果をセッションに反映
    ///
    /// 画像が無い場合と送信中の場合は何もしない。
    pub async fn submit(&mut self) -> &UploadSession {
        let before = self.session.submission();
        self.transition(SessionEvent::SubmitRequested);

        let submission = self.session.submission();
        if submission == before {
            tracing::debug!(status = self.session.status().as_str(), "submit ignored");
            return &self.session;
        }

        let outcome = match self.session.image() {
            Some(image) => self.transport.upload(image).await,
            None => return &self.session,
        };

        if let SubmitOutcome::Rejected { status, .. } = &outcome {
            tracing::warn!(status, "upstream rejected the upload");
        }

        self.transition(SessionEvent::SubmitCompleted { submission, outcome });

        match self.session.status() {
            SessionStatus::Succeeded => {
                tracing::info!(matches = self.session.matches().len(), "match succeeded");
            }
            _ => {
                tracing::warn!(error = self.session.error().unwrap_or_default(), "match failed");
            }
        }
        &self.session
    }

    fn transition(&mut self, event: SessionEvent) -> &UploadSession {
        let session = std::mem::take(&mut self.session);
        self.session = session.apply(event);
        &self.session
    }
}
