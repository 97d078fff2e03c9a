//! Excel生成（共通ライブラリ）
//!
//! 平坦化した抽出結果の表を1シートのExcelに書き出す

use crate::error::{Error, Result};
use crate::projector::Table;
use rust_xlsxwriter::*;

const SHEET_NAME: &str = "Extracted Data";

/// 列幅の上限（文字数）
const MAX_COLUMN_WIDTH: usize = 60;
const MIN_COLUMN_WIDTH: usize = 8;

/// Excelをバッファに生成
///
/// 1行目はヘッダー（太字・固定表示）、以降1レコード1行。
pub fn generate_excel_buffer(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x6D63FF))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| Error::Excel(format!("failed to set sheet name: {}", e)))?;

    for (col, name) in table.columns.iter().enumerate() {
        let col = column_index(col)?;
        worksheet
            .write_string_with_format(0, col, name, &header_format)
            .map_err(|e| Error::Excel(format!("failed to write header: {}", e)))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1)
            .map_err(|_| Error::Excel("too many rows".into()))?;
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string_with_format(row_num, column_index(col)?, value, &value_format)
                .map_err(|e| Error::Excel(format!("failed to write cell: {}", e)))?;
        }
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet
            .set_column_width(column_index(col)?, width as f64)
            .map_err(|e| Error::Excel(format!("failed to set column width: {}", e)))?;
    }

    if !table.columns.is_empty() {
        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| Error::Excel(format!("failed to freeze header row: {}", e)))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| Error::Excel(format!("failed to save workbook: {}", e)))
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| Error::Excel("too many columns".into()))
}

/// 各列の表示幅（ヘッダーと値の最大文字数）
fn column_widths(table: &Table) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|v| v.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}
