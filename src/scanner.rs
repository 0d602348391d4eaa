//! 画像ファイルの読み込みとフォルダ走査

use crate::error::{Result, ShopperMatchError};
use image::ImageFormat;
use shopper_match_common::ImageFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

/// 判定できないファイルのコンテンツタイプ
const OCTET_STREAM: &str = "application/octet-stream";

/// ファイルを読み込み、コンテンツタイプを付与する
///
/// 画像かどうかの判定はセッション側で行うので、ここでは画像以外も返す。
pub fn read_image_file(path: &Path) -> Result<ImageFile> {
    if !path.is_file() {
        return Err(ShopperMatchError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| ShopperMatchError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let content_type = detect_content_type(path, &bytes);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(ImageFile::new(file_name, content_type, bytes))
}

/// マジックバイト、次に拡張子でMIMEタイプを判定
pub fn detect_content_type(path: &Path, bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| OCTET_STREAM.to_string())
}

/// フォルダ内の画像ファイルを列挙（ファイル名順）
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ShopperMatchError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();

    images.sort();
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}
