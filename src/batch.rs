//! フォルダ一括照合
//!
//! 画像ごとに新しいセッションで照合し、結果をレポートにまとめる。
//! 1枚の失敗は全体を止めない。

use crate::client::UploadTransport;
use crate::error::Result;
use crate::scanner;
use crate::workflow::MatchWorkflow;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use shopper_match_common::{SessionReport, SessionStatus};
use std::path::{Path, PathBuf};

/// 一括照合レポート
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub endpoint: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub sessions: Vec<SessionReport>,
}

impl BatchReport {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// 画像リストを順に照合
pub async fn run_batch<T: UploadTransport>(
    workflow: &mut MatchWorkflow<T>,
    images: &[PathBuf],
    endpoint: &str,
    show_progress: bool,
) -> BatchReport {
    let pb = if show_progress {
        let pb = ProgressBar::new(images.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut sessions = Vec::with_capacity(images.len());
    for path in images {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        pb.set_message(display_name.clone());

        sessions.push(match_one(workflow, path, &display_name).await);
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    let succeeded = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Succeeded)
        .count();

    BatchReport {
        generated_at: Utc::now(),
        endpoint: endpoint.to_string(),
        total: sessions.len(),
        succeeded,
        failed: sessions.len() - succeeded,
        sessions,
    }
}

async fn match_one<T: UploadTransport>(
    workflow: &mut MatchWorkflow<T>,
    path: &Path,
    display_name: &str,
) -> SessionReport {
    workflow.reset();

    let file = match scanner::read_image_file(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "failed to read image");
            return SessionReport {
                file_name: Some(display_name.to_string()),
                status: SessionStatus::Failed,
                error: Some(e.to_string()),
                ..Default::default()
            };
        }
    };

    workflow.select_image(file);
    let mut report = workflow.submit().await.report();
    if report.file_name.is_none() {
        report.file_name = Some(display_name.to_string());
    }
    report
}
