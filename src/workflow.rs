//! ワークフロー状態機械
//!
//! configure → review の2段階。review は必ず抽出結果を持つ
//! （結果は `Phase::Review` の中にしか存在しない）。
//!
//! 表示層はここの遷移メソッドだけを呼ぶ。CLI・対話セッション・テストで共通。

use crate::document::{default_storage_dir, SourceDocument};
use crate::error::{DocuStructError, Result};
use crate::extractor::ExtractionBackend;
use docustruct_common::{
    build_schema, seed_defaults, DocumentType, ExtractionResult, ExtractionSchema, FieldSpec,
};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Configure,
    Review(ExtractionResult),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Configure => "configure",
            Phase::Review(_) => "review",
        }
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    document_type: DocumentType,
    fields: Vec<FieldSpec>,
    document: Option<SourceDocument>,
    storage_dir: PathBuf,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_storage_dir(default_storage_dir())
    }

    /// 一時文書の保存先を指定して生成
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        let document_type = DocumentType::default();
        Self {
            phase: Phase::Configure,
            document_type,
            fields: document_type.default_fields(),
            document: None,
            storage_dir: storage_dir.into(),
        }
    }

    // =============================================
    // 参照
    // =============================================

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        match &self.phase {
            Phase::Review(result) => Some(result),
            Phase::Configure => None,
        }
    }

    /// 現在のフィールドから生成されるスキーマ（プレビュー用）
    pub fn schema(&self) -> ExtractionSchema {
        build_schema(&self.fields)
    }

    /// 抽出を実行できる状態か
    pub fn is_ready(&self) -> bool {
        self.validate_submission().is_ok()
    }

    // =============================================
    // configure フェーズの遷移
    // =============================================

    /// プリセットを切り替え（編集中のフィールドは破棄）
    pub fn select_preset(&mut self, name: &str) -> Result<()> {
        self.require_configure("select_preset")?;
        let fields = seed_defaults(name)?;
        self.document_type = DocumentType::from_name(name)?;
        self.fields = fields;
        tracing::debug!(preset = %self.document_type, "preset selected");
        Ok(())
    }

    pub fn edit_field(&mut self, index: usize, name: &str, description: &str) -> Result<()> {
        self.require_configure("edit_field")?;
        self.check_index(index)?;

        let updated = FieldSpec::new(name, description);
        if !updated.is_blank() {
            let duplicate = self
                .fields
                .iter()
                .enumerate()
                .any(|(i, f)| i != index && f.name == updated.name);
            if duplicate {
                return Err(DocuStructError::Validation(format!(
                    "Field name `{}` is already defined.",
                    updated.name
                )));
            }
        }

        self.fields[index] = updated;
        Ok(())
    }

    /// 空フィールドを末尾に追加し、そのインデックスを返す
    pub fn add_field(&mut self) -> Result<usize> {
        self.require_configure("add_field")?;
        self.fields.push(FieldSpec::default());
        Ok(self.fields.len() - 1)
    }

    pub fn remove_field(&mut self, index: usize) -> Result<FieldSpec> {
        self.require_configure("remove_field")?;
        self.check_index(index)?;
        Ok(self.fields.remove(index))
    }

    /// 現在のプリセットのデフォルトに戻す
    pub fn reset_fields(&mut self) -> Result<()> {
        self.require_configure("reset_fields")?;
        self.fields = self.document_type.default_fields();
        Ok(())
    }

    /// 文書を一時保存（既存の文書は置き換えて削除）
    pub fn upload_document(&mut self, bytes: &[u8], original_name: &str) -> Result<&SourceDocument> {
        self.require_configure("upload_document")?;
        let document = SourceDocument::store(bytes, original_name, &self.storage_dir)?;
        tracing::debug!(name = original_name, "document uploaded to session");
        let document = self.document.insert(document);
        Ok(&*document)
    }

    /// 抽出を実行し、成功したら review へ遷移
    ///
    /// 失敗時は configure のまま、結果は保存されない。
    pub async fn submit_extraction<B: ExtractionBackend>(&mut self, backend: &B) -> Result<()> {
        self.require_configure("submit_extraction")?;
        let (document, schema) = self.validate_submission()?;

        tracing::debug!(fields = schema.len(), preset = %self.document_type, "submitting extraction");
        let result = backend.extract(document, &schema, self.document_type).await?;

        self.phase = Phase::Review(result);
        Ok(())
    }

    // =============================================
    // review フェーズの遷移
    // =============================================

    /// 「別のファイルを処理」: 初期状態に戻す
    pub fn reset(&mut self) -> Result<()> {
        if !matches!(self.phase, Phase::Review(_)) {
            return Err(self.invalid_phase("reset"));
        }
        let storage_dir = std::mem::take(&mut self.storage_dir);
        *self = Self::with_storage_dir(storage_dir);
        tracing::debug!("session reset");
        Ok(())
    }

    // =============================================
    // 内部
    // =============================================

    fn validate_submission(&self) -> Result<(&SourceDocument, ExtractionSchema)> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| DocuStructError::Validation("Upload a file first.".into()))?;

        let schema = build_schema(&self.fields);
        if schema.is_empty() {
            return Err(DocuStructError::Validation("Add at least one field.".into()));
        }
        Ok((document, schema))
    }

    fn require_configure(&self, operation: &'static str) -> Result<()> {
        match self.phase {
            Phase::Configure => Ok(()),
            Phase::Review(_) => Err(self.invalid_phase(operation)),
        }
    }

    fn invalid_phase(&self, operation: &'static str) -> DocuStructError {
        DocuStructError::InvalidPhase {
            operation,
            phase: self.phase.name(),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.fields.len() {
            Ok(())
        } else {
            Err(DocuStructError::IndexOutOfRange {
                index,
                len: self.fields.len(),
            })
        }
    }
}
