use clap::{Parser, Subcommand};
use docustruct_common::FieldSpec;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docustruct")]
#[command(about = "Extract user-defined fields from PDF and PNG documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 文書を1回抽出して結果を表示・出力
    Extract {
        /// 文書ファイル（PDF / PNG）
        #[arg(required = true)]
        file: PathBuf,

        /// ドキュメント種別 (Form/Receipt)
        #[arg(short, long, default_value = "Form")]
        preset: String,

        /// 追加フィールド name=description（複数指定可）
        #[arg(short = 'F', long = "field", value_parser = parse_field_arg)]
        fields: Vec<FieldSpec>,

        /// プリセットのデフォルトフィールドを使わない
        #[arg(long)]
        no_defaults: bool,

        /// 出力形式 (json/csv/xlsx/all)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ（省略時は表示のみ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 対話式で抽出（フィールド編集 → 抽出 → 確認 → 出力）
    Session {
        /// 最初に読み込む文書ファイル
        file: Option<PathBuf>,

        /// 初期ドキュメント種別
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// 保存済みの抽出結果JSONを表形式で表示・再出力
    Project {
        /// 抽出結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力形式 (json/csv/xlsx/all)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ（省略時は表示のみ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 組み込みプリセットとフィールドを表示
    Presets,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// `name=description` 形式のフィールド指定をパース
pub fn parse_field_arg(s: &str) -> Result<FieldSpec, String> {
    let (name, description) = s.split_once('=').unwrap_or((s, ""));
    let field = FieldSpec::new(name, description);
    if field.is_blank() {
        return Err(format!("Field name is empty: {:?}", s));
    }
    Ok(field)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Excel,
    All,
}

impl ExportFormat {
    /// 出力するファイルの拡張子
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ExportFormat::Json => &["json"],
            ExportFormat::Csv => &["csv"],
            ExportFormat::Excel => &["xlsx"],
            ExportFormat::All => &["json", "csv", "xlsx"],
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "all" | "both" => Ok(ExportFormat::All),
            _ => Err(format!("Unknown format: {}. Use json, csv, xlsx, or all", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "xlsx"),
            ExportFormat::All => write!(f, "all"),
        }
    }
}
