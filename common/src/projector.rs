//! 抽出結果の表形式変換
//!
//! ネストしたレコードを `parent_child` 形式の列名に平坦化し、
//! 表示・CSV/Excel出力用の表を作る。

use crate::error::{Error, Result};
use crate::types::ExtractionResult;
use serde_json::{Map, Value};

/// 列名の区切り文字
pub const COLUMN_SEPARATOR: &str = "_";

/// 配列要素がオブジェクトでない場合の列名
const SCALAR_COLUMN: &str = "value";

/// 平坦化済みの表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 行ごとの (列名, 値) ペア
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &str)>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }

    /// 列名で値を取得
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }
}

/// 変換結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// 表示できるデータなし
    NoData,
    Table(Table),
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Projection::NoData)
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Projection::Table(table) => Some(table),
            Projection::NoData => None,
        }
    }
}

/// 抽出結果を表に変換
pub fn project(result: &ExtractionResult) -> Projection {
    let flat_rows: Vec<Vec<(String, String)>> = match result.as_value() {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(flatten_record).collect(),
        record => vec![flatten_record(record)],
    };

    // 列は出現順の和集合
    let mut columns: Vec<String> = Vec::new();
    for row in &flat_rows {
        for (key, _) in row {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    if columns.is_empty() {
        return Projection::NoData;
    }

    let rows = flat_rows
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| {
                    row.iter()
                        .find(|(key, _)| key == col)
                        .map(|(_, value)| value.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Projection::Table(Table { columns, rows })
}

fn flatten_record(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => flatten_into(map, None, &mut out),
        Value::Null => {}
        scalar => push_cell(&mut out, SCALAR_COLUMN.to_string(), render_cell(scalar)),
    }
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let column = match prefix {
            Some(parent) => format!("{}{}{}", parent, COLUMN_SEPARATOR, key),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(child, Some(&column), out),
            other => push_cell(out, column, render_cell(other)),
        }
    }
}

/// 平坦化後の列名が既存の列と衝突したら `_2`, `_3`, ... を付けて両方残す
///
/// `{"a_b": 1, "a": {"b": 2}}` → `a_b`, `a_b_2`
fn push_cell(out: &mut Vec<(String, String)>, column: String, value: String) {
    let taken = |name: &str| out.iter().any(|(key, _)| key == name);
    let mut unique = column.clone();
    let mut suffix = 2;
    while taken(&unique) {
        unique = format!("{}{}{}", column, COLUMN_SEPARATOR, suffix);
        suffix += 1;
    }
    out.push((unique, value));
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// JSON出力（2スペースインデント、可逆）
pub fn to_json(result: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result.as_value())?)
}

/// 区切りテキスト（CSV）出力
///
/// ヘッダー行 + レコードごとに1行。区切り文字や引用符を含む値は
/// 引用符で囲み、内部の引用符は二重化する。
pub fn to_delimited_text(table: &Table) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(&table.columns)
        .map_err(|e| Error::Io(e.into()))?;
    for row in &table.rows {
        writer.write_record(row).map_err(|e| Error::Io(e.into()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Parse(e.to_string()))
}
