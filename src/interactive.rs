//! 対話式セッション
//!
//! configure: プリセット選択・フィールド編集・文書アップロード → 抽出
//! review: 結果確認・出力 → 別のファイルを処理（初期状態に戻す）
//!
//! エラーは1行で表示してループを継続する。

use crate::cli::ExportFormat;
use crate::config::Config;
use crate::display::{print_fields, print_projection, spinner};
use crate::error::{DocuStructError, Result};
use crate::export::export_result;
use crate::extractor::ExtractionBackend;
use crate::workflow::{Phase, Session};
use dialoguer::{Input, Password, Select};
use docustruct_common::{project, DocumentType};
use std::path::{Path, PathBuf};

/// configure フェーズの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureAction {
    Upload,
    SelectPreset,
    EditField,
    AddField,
    RemoveField,
    ResetFields,
    Extract,
    Quit,
}

impl ConfigureAction {
    pub const ALL: [ConfigureAction; 8] = [
        ConfigureAction::Upload,
        ConfigureAction::SelectPreset,
        ConfigureAction::EditField,
        ConfigureAction::AddField,
        ConfigureAction::RemoveField,
        ConfigureAction::ResetFields,
        ConfigureAction::Extract,
        ConfigureAction::Quit,
    ];

    /// メニュー上の位置
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|a| a == self).unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfigureAction::Upload => "Upload file (PDF or PNG)",
            ConfigureAction::SelectPreset => "Change document type",
            ConfigureAction::EditField => "Edit field",
            ConfigureAction::AddField => "Add field",
            ConfigureAction::RemoveField => "Remove field",
            ConfigureAction::ResetFields => "Reset to default fields",
            ConfigureAction::Extract => "Extract data",
            ConfigureAction::Quit => "Quit",
        }
    }
}

/// review フェーズの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Export,
    ProcessAnother,
    Quit,
}

impl ReviewAction {
    pub const ALL: [ReviewAction; 3] = [
        ReviewAction::Export,
        ReviewAction::ProcessAnother,
        ReviewAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReviewAction::Export => "Export (JSON / CSV / Excel)",
            ReviewAction::ProcessAnother => "Process another file",
            ReviewAction::Quit => "Quit",
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// APIキーを解決し、なければ対話で入力を求める
pub fn resolve_api_key_interactive(config: &Config) -> Result<String> {
    if let Ok(key) = config.get_api_key() {
        return Ok(key);
    }

    let key: String = Password::new()
        .with_prompt("Enter Google API Key")
        .allow_empty_password(true)
        .interact()?;

    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(DocuStructError::MissingApiKey);
    }
    Ok(key)
}

/// 対話セッションを実行
pub async fn run_session<B: ExtractionBackend>(
    backend: &B,
    session: &mut Session,
    initial_file: Option<&Path>,
) -> Result<()> {
    println!("📄 docustruct - interactive session\n");

    if let Some(file) = initial_file {
        report(upload_from_path(session, file));
    }

    loop {
        let step = match session.phase() {
            Phase::Configure => configure_step(backend, session).await,
            Phase::Review(_) => review_step(session),
        };

        match step {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            // 端末入力が取れない場合はループを抜ける
            Err(e @ DocuStructError::Prompt(_)) => return Err(e),
            Err(e) => println!("✖ {}\n", e),
        }
    }

    println!("\n✅ Session finished");
    Ok(())
}

async fn configure_step<B: ExtractionBackend>(backend: &B, session: &mut Session) -> Result<Flow> {
    println!("Document type: {}", session.document_type());
    match session.document() {
        Some(doc) => println!("File: {}", doc.original_name()),
        None => println!("File: (none)"),
    }
    println!("Fields to extract:");
    print_fields(session.fields());
    println!();

    let labels: Vec<&str> = ConfigureAction::ALL.iter().map(|a| a.label()).collect();
    let default = if session.is_ready() {
        ConfigureAction::Extract.position()
    } else {
        ConfigureAction::Upload.position()
    };
    let choice = Select::new()
        .with_prompt("Action")
        .items(&labels)
        .default(default)
        .interact()?;

    match ConfigureAction::ALL[choice] {
        ConfigureAction::Upload => {
            let path: String = Input::new()
                .with_prompt("File path")
                .interact_text()?;
            upload_from_path(session, Path::new(path.trim()))?;
        }
        ConfigureAction::SelectPreset => {
            let names: Vec<&str> = DocumentType::ALL.iter().map(|d| d.name()).collect();
            let current = DocumentType::ALL
                .iter()
                .position(|d| *d == session.document_type())
                .unwrap_or(0);
            let idx = Select::new()
                .with_prompt("Document type")
                .items(&names)
                .default(current)
                .interact()?;
            session.select_preset(names[idx])?;
        }
        ConfigureAction::EditField => {
            if let Some(index) = pick_field(session, "Field to edit")? {
                edit_field_prompt(session, index)?;
            }
        }
        ConfigureAction::AddField => {
            let index = session.add_field()?;
            edit_field_prompt(session, index)?;
        }
        ConfigureAction::RemoveField => {
            if let Some(index) = pick_field(session, "Field to remove")? {
                let removed = session.remove_field(index)?;
                println!("✔ Removed: {}", removed.name);
            }
        }
        ConfigureAction::ResetFields => {
            session.reset_fields()?;
            println!("✔ Fields reset to {} defaults", session.document_type());
        }
        ConfigureAction::Extract => {
            let pb = spinner("Extracting data...");
            let outcome = session.submit_extraction(backend).await;
            pb.finish_and_clear();
            outcome?;
            println!("✔ Extraction complete\n");
        }
        ConfigureAction::Quit => return Ok(Flow::Quit),
    }

    println!();
    Ok(Flow::Continue)
}

fn review_step(session: &mut Session) -> Result<Flow> {
    let Some(result) = session.result().cloned() else {
        return Ok(Flow::Continue);
    };

    if let Some(doc) = session.document() {
        println!("Original File: {}", doc.original_name());
    }
    println!("Extracted Data");
    print_projection(&project(&result));
    println!();

    let labels: Vec<&str> = ReviewAction::ALL.iter().map(|a| a.label()).collect();
    let choice = Select::new()
        .with_prompt("Action")
        .items(&labels)
        .default(0)
        .interact()?;

    match ReviewAction::ALL[choice] {
        ReviewAction::Export => {
            let formats = ["json", "csv", "xlsx", "all"];
            let idx = Select::new()
                .with_prompt("Format")
                .items(&formats)
                .default(0)
                .interact()?;
            let format: ExportFormat = formats[idx]
                .parse()
                .map_err(DocuStructError::Export)?;

            let output: String = Input::new()
                .with_prompt("Output directory or file")
                .default(".".to_string())
                .interact_text()?;

            for path in export_result(&result, &format, &PathBuf::from(output.trim()))? {
                println!("✔ Saved: {}", path.display());
            }
        }
        ReviewAction::ProcessAnother => {
            session.reset()?;
            println!("✔ Ready for another file\n");
        }
        ReviewAction::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

/// ローカルファイルを読み込んでセッションにアップロード
pub fn upload_from_path(session: &mut Session, path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(DocuStructError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    session.upload_document(&bytes, &name)?;
    println!("✔ File ready for field configuration: {}", name);
    Ok(())
}

fn pick_field(session: &Session, prompt: &str) -> Result<Option<usize>> {
    if session.fields().is_empty() {
        println!("No fields defined.");
        return Ok(None);
    }
    let labels: Vec<String> = session
        .fields()
        .iter()
        .map(|f| {
            if f.is_blank() {
                "(empty)".to_string()
            } else {
                format!("{}: {}", f.name, f.description)
            }
        })
        .collect();

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(idx)
}

fn edit_field_prompt(session: &mut Session, index: usize) -> Result<()> {
    let current = session
        .fields()
        .get(index)
        .cloned()
        .unwrap_or_default();

    let name: String = Input::new()
        .with_prompt("Field name")
        .with_initial_text(current.name)
        .allow_empty(true)
        .interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description")
        .with_initial_text(current.description)
        .allow_empty(true)
        .interact_text()?;

    session.edit_field(index, &name, &description)
}

fn report(outcome: Result<()>) {
    if let Err(e) = outcome {
        println!("✖ {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_action_labels_unique() {
        let labels: std::collections::HashSet<&str> =
            ConfigureAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), ConfigureAction::ALL.len());
        for action in ConfigureAction::ALL {
            assert_eq!(ConfigureAction::ALL[action.position()], action);
        }
        assert_eq!(ReviewAction::ALL[1].label(), "Process another file");
    }

    #[test]
    fn test_upload_from_path_missing_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut session = Session::with_storage_dir(dir.path());

        let err = upload_from_path(&mut session, &dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(err, DocuStructError::FileNotFound(_)));
    }

    #[test]
    fn test_upload_from_path() {
        let dir = tempdir().expect("Failed to create temp dir");
        let file = dir.path().join("receipt.png");
        std::fs::write(&file, b"\x89PNG").unwrap();

        let mut session = Session::with_storage_dir(dir.path().join("store"));
        upload_from_path(&mut session, &file).unwrap();
        assert_eq!(session.document().unwrap().original_name(), "receipt.png");
    }
}
