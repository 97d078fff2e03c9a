//! アップロード文書の一時保存
//!
//! セッションごとに1件。新しい文書をアップロードすると前の文書は破棄され、
//! `SourceDocument` のドロップ時に一時ファイルも削除される。

use crate::error::{DocuStructError, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 受け付ける拡張子と MIME タイプ
const SUPPORTED_TYPES: &[(&str, &str)] = &[("pdf", "application/pdf"), ("png", "image/png")];

/// 一時保存ディレクトリ（OS の temp 配下）
pub fn default_storage_dir() -> PathBuf {
    std::env::temp_dir().join("docustruct")
}

/// ファイル名から (拡張子, MIME タイプ) を判定
pub fn detect_document_type(original_name: &str) -> Result<(String, &'static str)> {
    let ext = Path::new(original_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    SUPPORTED_TYPES
        .iter()
        .find(|(supported, _)| *supported == ext)
        .map(|(supported, mime)| (supported.to_string(), *mime))
        .ok_or_else(|| DocuStructError::UnsupportedFormat(original_name.to_string()))
}

#[derive(Debug)]
pub struct SourceDocument {
    path: PathBuf,
    original_name: String,
    extension: String,
    mime_type: &'static str,
}

impl SourceDocument {
    /// バイト列を `<dir>/<uuid>.<ext>` に保存
    pub fn store(bytes: &[u8], original_name: &str, dir: &Path) -> Result<Self> {
        let (extension, mime_type) = detect_document_type(original_name)?;
        if bytes.is_empty() {
            return Err(DocuStructError::Validation(format!(
                "Uploaded file is empty: {}",
                original_name
            )));
        }

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        std::fs::write(&path, bytes)?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "stored source document");

        Ok(Self {
            path,
            original_name: original_name.to_string(),
            extension,
            mime_type,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// 保存済みファイル名（リモート側の表示名に使う）
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.original_name.clone())
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path)
            .map_err(|_| DocuStructError::FileNotFound(self.path.display().to_string()))
    }
}

impl Drop for SourceDocument {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove source document");
            }
        }
    }
}
