//! 端末表示ヘルパー

use docustruct_common::{DocumentType, FieldSpec, Projection};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// フィールド一覧を表示
pub fn print_fields(fields: &[FieldSpec]) {
    let width = fields
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Field Name".len());

    println!("  {:>3}  {:<width$}  Description", "#", "Field Name", width = width);
    for (i, field) in fields.iter().enumerate() {
        let name = if field.is_blank() { "(empty)" } else { field.name.as_str() };
        println!("  {:>3}  {:<width$}  {}", i + 1, name, field.description, width = width);
    }
}

/// 抽出結果を「フィールド: 値」形式で表示
pub fn print_projection(projection: &Projection) {
    let Some(table) = projection.table() else {
        println!("No data extracted.");
        return;
    };

    let width = table.columns.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    let multi = table.row_count() > 1;

    for (idx, record) in table.records().enumerate() {
        if multi {
            println!("Record {}", idx + 1);
        }
        for (column, value) in record {
            println!("  {:<width$}  {}", column, value, width = width);
        }
        println!("---");
    }
}

/// 組み込みプリセットを表示
pub fn print_presets() {
    for document_type in DocumentType::ALL {
        println!("{}", document_type);
        print_fields(&document_type.default_fields());
        println!();
    }
}

/// 抽出中のスピナー
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
