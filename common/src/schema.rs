//! 抽出スキーマ生成
//!
//! ユーザー定義のフィールド一覧から、モデル出力を制約する
//! JSON Schema を組み立てる。

use crate::types::FieldSpec;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// バックエンドが受け付けないキーワード
const UNSUPPORTED_KEYWORDS: &[&str] = &["additionalProperties"];

/// キーがフィールド名・定義名になるキーワード
const NAME_KEYED_KEYWORDS: &[&str] = &["properties", "patternProperties", "$defs", "definitions"];

const SCHEMA_TITLE: &str = "DynamicSchema";

/// 文字列スロット1つ分の定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSlot {
    pub name: String,
    pub description: String,
}

/// 抽出スキーマ（不変）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSchema {
    slots: Vec<SchemaSlot>,
}

impl ExtractionSchema {
    pub fn slots(&self) -> &[SchemaSlot] {
        &self.slots
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 生のJSON Schema（additionalProperties付き）
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for slot in &self.slots {
            properties.insert(
                slot.name.clone(),
                json!({
                    "title": title_case(&slot.name),
                    "type": "string",
                    "description": slot.description,
                }),
            );
        }

        let required: Vec<&str> = self.field_names().collect();

        json!({
            "title": SCHEMA_TITLE,
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// 送信用に正規化したスキーマ
    pub fn normalized(&self) -> Value {
        strip_unsupported_keywords(self.to_json_schema())
    }
}

/// フィールド一覧からスキーマを生成
///
/// - 名前と説明は前後の空白を除去
/// - 名前が空のフィールドは除外
/// - 同名フィールドは最初の1件のみ採用
pub fn build_schema(fields: &[FieldSpec]) -> ExtractionSchema {
    let mut seen = HashSet::new();
    let slots = fields
        .iter()
        .filter_map(|field| {
            let name = field.name.trim();
            if name.is_empty() || !seen.insert(name.to_string()) {
                return None;
            }
            Some(SchemaSlot {
                name: name.to_string(),
                description: field.description.trim().to_string(),
            })
        })
        .collect();

    ExtractionSchema { slots }
}

/// 非対応キーワードを全階層から除去
///
/// ルート以外の階層に additionalProperties があると
/// バックエンドがリクエストを拒否する。
/// `properties` 等のキーはフィールド名なので除去せず、値だけ再帰する。
pub fn strip_unsupported_keywords(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !UNSUPPORTED_KEYWORDS.contains(&key.as_str()))
                .map(|(key, v)| {
                    let v = if NAME_KEYED_KEYWORDS.contains(&key.as_str()) {
                        strip_named_schemas(v)
                    } else {
                        strip_unsupported_keywords(v)
                    };
                    (key, v)
                })
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(strip_unsupported_keywords).collect())
        }
        other => other,
    }
}

/// 名前 → サブスキーマのマップ（キーはそのまま残す）
fn strip_named_schemas(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(name, schema)| (name, strip_unsupported_keywords(schema)))
                .collect(),
        ),
        other => strip_unsupported_keywords(other),
    }
}

/// "date_of_birth" -> "Date Of Birth"
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
