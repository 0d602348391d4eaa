//! 照合結果のターミナル表示

use crate::client::HealthStatus;
use shopper_match_common::{ProductMatch, SessionStatus, UploadSession};
use std::fmt::Write as _;

/// セッションを表示用テキストに整形
pub fn render_session(session: &UploadSession) -> String {
    let mut out = String::new();

    if let Some(image) = session.image() {
        let _ = writeln!(out, "Image:    {} ({})", image.file_name, image.content_type);
    }
    if let Some(caption) = session.raw_caption() {
        let _ = writeln!(out, "Caption:  {}", caption);
    }
    if let Some(query) = session.refined_query() {
        let _ = writeln!(out, "Query:    {}", query);
    }
    if !session.apis_used().is_empty() {
        let apis = session
            .apis_used()
            .iter()
            .map(|(name, used)| format!("{} {}", name, if *used { "✔" } else { "✗" }))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "APIs:     {}", apis);
    }

    match session.status() {
        SessionStatus::Idle => out.push_str("No image selected\n"),
        SessionStatus::ImageSelected => out.push_str("Ready to search\n"),
        SessionStatus::Submitting => out.push_str("Searching...\n"),
        SessionStatus::Succeeded => {
            let preview = session.image().map(|i| i.preview.as_str()).unwrap_or_default();
            let _ = writeln!(out, "\nFound {} similar products:", session.matches().len());
            for product in session.matches() {
                out.push_str(&render_match(product, preview));
            }
        }
        SessionStatus::Failed => {
            let _ = writeln!(out, "✖ {}", session.error().unwrap_or("Unknown error"));
        }
    }

    out
}

/// 商品1件を整形
///
/// 画像がアップロード画像のプレビューそのものなら長いData URLは出さない。
pub fn render_match(product: &ProductMatch, preview: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:>2}. {}  [{}%]", product.id, product.name, product.similarity);

    let details: Vec<&str> = [product.price.as_str(), product.store.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !details.is_empty() {
        let _ = writeln!(out, "      {}", details.join(" · "));
    }
    if product.link != "#" {
        let _ = writeln!(out, "      {}", product.link);
    }
    if !product.snippet.is_empty() {
        let _ = writeln!(out, "      {}", product.snippet);
    }
    if product.image == preview {
        out.push_str("      image: (uploaded image)\n");
    } else {
        let _ = writeln!(out, "      image: {}", product.image);
    }
    out
}

/// ヘルスチェック結果を整形
pub fn render_health(endpoint: &str, health: &HealthStatus) -> String {
    let mut out = String::new();
    let mark = if health.is_healthy() { "✔" } else { "✖" };
    let _ = writeln!(out, "{} {} is {}", mark, endpoint, health.status);
    if let Some(timestamp) = &health.timestamp {
        let _ = writeln!(out, "  timestamp: {}", timestamp);
    }
    for (name, state) in &health.api_keys {
        let _ = writeln!(out, "  {:<12} {}", name, state);
    }
    out
}
