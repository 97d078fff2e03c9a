//! 抽出パイプラインの型定義
//!
//! CLIと対話セッションで共有される型:
//! - FieldSpec: ユーザーが宣言する抽出フィールド（名前 + 説明）
//! - DocumentType: 組み込みプリセット（Form / Receipt）
//! - ExtractionResult: モデルが返した構造化データ

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 抽出フィールド定義
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSpec {
    pub name: String,
    pub description: String,
}

impl FieldSpec {
    /// 前後の空白を除去して生成
    pub fn new(name: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            description: description.as_ref().trim().to_string(),
        }
    }

    /// 名前が空（空白のみ含む）か
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// ドキュメント種別（プリセット）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[default]
    Form,
    Receipt,
}

const FORM_FIELDS: &[(&str, &str)] = &[
    ("first_name", "User\u{2019}s given name"),
    ("last_name", "User\u{2019}s family name"),
    ("date_of_birth", "Date of birth in DD/MM/YYYY"),
    ("address", "Full mailing address"),
    ("phone_number", "Primary contact phone number"),
    ("gender", "User\u{2019}s gender (e.g. Male, Female, Other)"),
];

const RECEIPT_FIELDS: &[(&str, &str)] = &[
    ("merchant_name", "Name of store or vendor"),
    ("transaction_date", "Date of purchase (DD/MM/YYYY)"),
    ("total_amount", "Grand total charged"),
    ("tax_amount", "Total tax applied"),
    ("payment_method", "Method of payment (e.g. Visa, Cash)"),
    ("items", "Line-items purchased with price and qty"),
];

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [DocumentType::Form, DocumentType::Receipt];

    /// 表示名
    pub fn name(&self) -> &'static str {
        match self {
            DocumentType::Form => "Form",
            DocumentType::Receipt => "Receipt",
        }
    }

    /// 名前からプリセットを検索（大文字小文字を区別しない）
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "form" => Ok(DocumentType::Form),
            "receipt" => Ok(DocumentType::Receipt),
            _ => Err(Error::UnknownPreset(name.to_string())),
        }
    }

    /// 組み込みカタログ（静的データ）
    pub fn catalog(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DocumentType::Form => FORM_FIELDS,
            DocumentType::Receipt => RECEIPT_FIELDS,
        }
    }

    /// デフォルトフィールドを新しいVecとして返す
    pub fn default_fields(&self) -> Vec<FieldSpec> {
        self.catalog()
            .iter()
            .map(|(name, desc)| FieldSpec::new(name, desc))
            .collect()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// プリセット名からデフォルトフィールドを生成
///
/// 戻り値は毎回新しく確保されるため、呼び出し側で編集しても
/// カタログには影響しない。
pub fn seed_defaults(preset_name: &str) -> Result<Vec<FieldSpec>> {
    Ok(DocumentType::from_name(preset_name)?.default_fields())
}

/// モデルが返した構造化データ
///
/// 単一レコード（オブジェクト）またはレコード配列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(Value);

impl ExtractionResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// 複数レコードか
    pub fn is_multi_record(&self) -> bool {
        self.0.is_array()
    }
}

impl From<Value> for ExtractionResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
