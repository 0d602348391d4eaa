//! 上流サービスのレスポンスと商品マッチの型定義
//!
//! - UploadResponse: `POST /upload` のレスポンス（フィールドはすべて任意）
//! - ProductMatch: 正規化後の検索結果1件

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 上流APIの利用可否（blip / gemini / tavily など）
pub type ApisUsed = BTreeMap<String, bool>;

/// アップロードAPIのレスポンス
///
/// 上流は形の揺れたJSONを返すため、型付きデシリアライズではなく
/// `Value` から寛容に取り出す。真偽判定は [`is_truthy`] に従う。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadResponse {
    pub success: bool,
    pub raw_caption: Option<String>,
    pub refined_query: Option<String>,
    pub apis_used: ApisUsed,
    /// 結果レコード（配列以外は空扱い）
    pub results: Vec<Value>,
    /// 失敗時のメッセージ
    pub detail: Option<String>,
}

impl UploadResponse {
    /// レスポンスボディ文字列をパース
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let apis_used: ApisUsed = value
            .get("processing_info")
            .and_then(|info| info.get("apis_used"))
            .and_then(Value::as_object)
            .map(|apis| {
                apis.iter()
                    .map(|(name, flag)| (name.clone(), is_truthy(flag)))
                    .collect()
            })
            .unwrap_or_default();

        let results = value
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            success: value.get("success").is_some_and(is_truthy),
            raw_caption: value.get("raw_caption").and_then(truthy_text),
            refined_query: value.get("refined_query").and_then(truthy_text),
            apis_used,
            results,
            detail: detail_message(value),
        }
    }
}

/// 商品マッチ（正規化済み）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    /// 1始まりの順位
    pub id: usize,
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub store: String,
    pub image: String,
    /// 類似度 (0-100)
    pub similarity: u8,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// JSON値の真偽判定
///
/// null / false / 0 / NaN / 空文字列のみ偽。配列とオブジェクトは空でも真。
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 真の値を表示用テキストに変換（偽ならNone）
pub fn truthy_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// エラーボディから `detail` メッセージを取り出す
pub fn detail_message(body: &Value) -> Option<String> {
    body.get("detail").and_then(truthy_text)
}
