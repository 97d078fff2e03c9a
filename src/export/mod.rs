//! 抽出結果のファイル出力（JSON / CSV / Excel）

use crate::cli::ExportFormat;
use crate::error::{DocuStructError, Result};
use docustruct_common::export::excel_core::generate_excel_buffer;
use docustruct_common::{project, to_delimited_text, to_json, ExtractionResult, Projection, Table};
use std::path::{Path, PathBuf};

/// 出力ファイル名（拡張子なし）のデフォルト
pub const DEFAULT_STEM: &str = "data";

/// 出力先パスを決定
///
/// ディレクトリまたは拡張子なしのパスなら `<dir>/data.<ext>`、
/// それ以外はファイル名の stem を流用する。
pub fn output_path_for_format(output: &Path, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", DEFAULT_STEM, extension))
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_STEM);
        parent.join(format!("{}.{}", stem, extension))
    }
}

pub fn write_json(result: &ExtractionResult, path: &Path) -> Result<()> {
    let text = to_json(result)?;
    write_file(path, text.as_bytes())
}

pub fn write_csv(projection: &Projection, path: &Path) -> Result<()> {
    let text = match projection {
        Projection::Table(table) => to_delimited_text(table)?,
        Projection::NoData => String::new(),
    };
    write_file(path, text.as_bytes())
}

pub fn write_excel(projection: &Projection, path: &Path) -> Result<()> {
    let empty = Table::default();
    let table = projection.table().unwrap_or(&empty);
    let buffer = generate_excel_buffer(table)
        .map_err(|e| DocuStructError::Export(e.to_string()))?;
    write_file(path, &buffer)
}

/// 指定形式で出力し、書き出したパスを返す
pub fn export_result(
    result: &ExtractionResult,
    format: &ExportFormat,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let projection = project(result);
    let mut written = Vec::new();

    for extension in format.extensions() {
        let path = output_path_for_format(output, extension);
        match *extension {
            "json" => write_json(result, &path)?,
            "csv" => write_csv(&projection, &path)?,
            "xlsx" => write_excel(&projection, &path)?,
            other => return Err(DocuStructError::Export(format!("unknown format: {}", other))),
        }
        tracing::info!(path = %path.display(), "exported");
        written.push(path);
    }

    Ok(written)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)
        .map_err(|e| DocuStructError::Export(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_without_extension() {
        let path = output_path_for_format(Path::new("out/results"), "csv");
        assert_eq!(path, PathBuf::from("out/results/data.csv"));
    }

    #[test]
    fn test_output_path_reuses_stem() {
        let path = output_path_for_format(Path::new("out/receipt.json"), "xlsx");
        assert_eq!(path, PathBuf::from("out/receipt.xlsx"));
    }
}
