//! 非対話の一括抽出（`docustruct extract`）

use crate::cli::ExportFormat;
use crate::display::{print_fields, print_projection, spinner};
use crate::error::{DocuStructError, Result};
use crate::export::export_result;
use crate::extractor::ExtractionBackend;
use crate::workflow::Session;
use docustruct_common::{project, FieldSpec};
use std::path::Path;

/// コマンドラインのフィールド指定をセッションに反映
///
/// - `no_defaults` ならプリセットのフィールドを全削除
/// - 既存と同名ならその説明を上書き、なければ末尾に追加
pub fn apply_field_overrides(
    session: &mut Session,
    fields: &[FieldSpec],
    no_defaults: bool,
) -> Result<()> {
    if no_defaults {
        while !session.fields().is_empty() {
            session.remove_field(0)?;
        }
    }

    for field in fields {
        let existing = session.fields().iter().position(|f| f.name == field.name);
        let index = match existing {
            Some(index) => index,
            None => session.add_field()?,
        };
        session.edit_field(index, &field.name, &field.description)?;
    }
    Ok(())
}

/// 1文書を抽出し、結果を表示（出力先があればファイル出力）
pub async fn run_extract<B: ExtractionBackend>(
    backend: &B,
    session: &mut Session,
    file: &Path,
    format: &ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let bytes = std::fs::read(file)
        .map_err(|_| DocuStructError::FileNotFound(file.display().to_string()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());

    session.upload_document(&bytes, &name)?;
    println!("✔ File ready: {}", name);

    println!("\n[{}] Fields to extract:", session.document_type());
    print_fields(session.fields());
    println!();

    let pb = spinner("Extracting data...");
    let outcome = session.submit_extraction(backend).await;
    pb.finish_and_clear();
    outcome?;

    let Some(result) = session.result() else {
        return Err(DocuStructError::Validation("No extraction result".into()));
    };

    println!("Extracted Data");
    print_projection(&project(result));

    if let Some(output) = output {
        for path in export_result(result, format, output)? {
            println!("✔ Saved: {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_apply_field_overrides_appends_and_replaces() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut session = Session::with_storage_dir(dir.path());
        session.select_preset("Receipt").unwrap();

        let fields = vec![
            FieldSpec::new("total_amount", "Total incl. tip"),
            FieldSpec::new("store_id", "Store number"),
        ];
        apply_field_overrides(&mut session, &fields, false).unwrap();

        assert_eq!(session.fields().len(), 7);
        assert_eq!(session.fields()[2].description, "Total incl. tip");
        assert_eq!(session.fields()[6], FieldSpec::new("store_id", "Store number"));
    }

    #[test]
    fn test_apply_field_overrides_no_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut session = Session::with_storage_dir(dir.path());

        apply_field_overrides(&mut session, &[FieldSpec::new("policy_no", "")], true).unwrap();
        assert_eq!(session.fields(), [FieldSpec::new("policy_no", "")].as_slice());
    }
}
