//! APIレスポンスパーサー
//!
//! モデルのレスポンステキストからJSONを取り出し、
//! ExtractionResult に変換する

use crate::error::{Error, Result};
use crate::types::ExtractionResult;
use serde_json::Value;

/// レスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最外側の {...} または [...]
/// 3. エラー
///
/// # Examples
/// ```
/// use docustruct_common::extract_json;
///
/// let response = "Result: {\"key\": \"value\"} done";
/// assert_eq!(extract_json(response).unwrap(), "{\"key\": \"value\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 先に現れた括弧の種類を採用
    let open = response.find(['{', '[']);
    if let Some(start) = open {
        let close = if response[start..].starts_with('{') { '}' } else { ']' };
        if let Some(end) = response.rfind(close) {
            if end > start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("no JSON found in response".into()))
}

/// 抽出レスポンスをパース
///
/// まずテキスト全体をJSONとして解釈し、失敗した場合のみ
/// コードブロック等からの抽出を試みる。
/// オブジェクトまたは配列以外は要求した形ではないためエラー。
pub fn parse_extraction_response(response: &str) -> Result<ExtractionResult> {
    let trimmed = response.trim();
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(first_err) => {
            let json_str = extract_json(trimmed)
                .map_err(|_| Error::Parse(format!("invalid JSON: {}", first_err)))?;
            serde_json::from_str(json_str)
                .map_err(|e| Error::Parse(format!("invalid JSON: {}", e)))?
        }
    };

    match value {
        Value::Object(_) | Value::Array(_) => Ok(ExtractionResult::new(value)),
        other => Err(Error::Parse(format!(
            "expected a JSON object or array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
