//! プレビュー用Data URLの生成

use base64::Engine as _;

/// 画像バイト列からData URLを生成
///
/// # Examples
/// ```
/// use shopper_match_common::to_data_url;
///
/// let url = to_data_url("image/png", &[0x89, 0x50]);
/// assert_eq!(url, "data:image/png;base64,iVA=");
/// ```
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, encoded)
}
