//! 検索結果の正規化
//!
//! 上流の結果レコード（形が揺れる）を固定形の [`ProductMatch`] に変換する。
//! 各フィールドは候補キーを順に見て、最初の真の値を採用する。

use crate::types::{truthy_text, ProductMatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// スコアが無い場合の類似度
pub const DEFAULT_SIMILARITY: u8 = 80;

const DEFAULT_NAME: &str = "Product";
const DEFAULT_LINK: &str = "#";

const NAME_KEYS: &[&str] = &["title", "name"];
const PRICE_KEYS: &[&str] = &["price"];
const STORE_KEYS: &[&str] = &["store", "source"];
const IMAGE_KEYS: &[&str] = &["image"];
const LINK_KEYS: &[&str] = &["link", "url"];
const SNIPPET_KEYS: &[&str] = &["snippet", "description"];

/// スコア0の扱い
///
/// `Fallback` は四捨五入して0..=100に収めた結果が0となるスコアを「スコアなし」と同一視して
/// [`DEFAULT_SIMILARITY`] を返す。`KeepZero` は0をそのまま返す。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroScorePolicy {
    #[default]
    Fallback,
    KeepZero,
}

impl std::str::FromStr for ZeroScorePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fallback" | "default" => Ok(ZeroScorePolicy::Fallback),
            "keep" | "keep-zero" | "zero" => Ok(ZeroScorePolicy::KeepZero),
            _ => Err(format!("Unknown zero-score policy: {}. Use fallback or keep", s)),
        }
    }
}

impl std::fmt::Display for ZeroScorePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZeroScorePolicy::Fallback => write!(f, "fallback"),
            ZeroScorePolicy::KeepZero => write!(f, "keep"),
        }
    }
}

/// 結果レコード列を正規化
///
/// # Arguments
/// * `records` - 上流の `results` 配列の要素
/// * `preview` - 画像が無いレコードに使うアップロード画像のプレビュー
/// * `policy` - スコア0の扱い
///
/// # Returns
/// 入力と同じ順序の商品マッチ（idは1始まりの位置）
pub fn normalize_results(
    records: &[Value],
    preview: &str,
    policy: ZeroScorePolicy,
) -> Vec<ProductMatch> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| normalize_record(idx + 1, record, preview, policy))
        .collect()
}

/// レコード1件を正規化（オブジェクト以外は全フィールドがデフォルト）
pub fn normalize_record(
    id: usize,
    record: &Value,
    preview: &str,
    policy: ZeroScorePolicy,
) -> ProductMatch {
    ProductMatch {
        id,
        name: first_text(record, NAME_KEYS).unwrap_or_else(|| DEFAULT_NAME.to_string()),
        price: first_text(record, PRICE_KEYS).unwrap_or_default(),
        store: first_text(record, STORE_KEYS).unwrap_or_default(),
        image: first_text(record, IMAGE_KEYS).unwrap_or_else(|| preview.to_string()),
        similarity: similarity_from_score(record.get("score"), policy),
        link: first_text(record, LINK_KEYS).unwrap_or_else(|| DEFAULT_LINK.to_string()),
        snippet: first_text(record, SNIPPET_KEYS).unwrap_or_default(),
    }
}

/// スコア (0.0-1.0) を類似度 (0-100) に変換
pub fn similarity_from_score(score: Option<&Value>, policy: ZeroScorePolicy) -> u8 {
    let Some(score) = score.and_then(score_as_f64) else {
        return DEFAULT_SIMILARITY;
    };

    // 負のスコアも0に丸めてからゼロ扱いを判定する
    let clamped = (score * 100.0).round().clamp(0.0, 100.0);
    if clamped == 0.0 {
        return match policy {
            ZeroScorePolicy::Fallback => DEFAULT_SIMILARITY,
            ZeroScorePolicy::KeepZero => 0,
        };
    }

    clamped as u8
}

fn score_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(truthy_text)
}
