//! プロンプト生成モジュール
//!
//! ドキュメント種別ごとの指示プロンプト（固定）

use crate::types::DocumentType;

/// 汎用フォーム抽出
pub const FORM_PROMPT: &str = "Extract all form fields as JSON.";

/// レシート抽出
pub const RECEIPT_PROMPT: &str = "Extract receipt details as JSON.";

/// ドキュメント種別に対応する指示プロンプト
pub fn instruction_prompt(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Form => FORM_PROMPT,
        DocumentType::Receipt => RECEIPT_PROMPT,
    }
}
