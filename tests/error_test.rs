//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use docustruct::document::SourceDocument;
use docustruct::error::DocuStructError;
use tempfile::tempdir;

/// 対応外の拡張子
#[test]
fn test_store_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = SourceDocument::store(b"hello", "notes.txt", dir.path());

    let err = result.unwrap_err();
    assert!(matches!(err, DocuStructError::UnsupportedFormat(_)));
    assert!(err.is_user_recoverable());
}

/// 空ファイル
#[test]
fn test_store_empty_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = SourceDocument::store(b"", "empty.pdf", dir.path());

    assert!(matches!(result, Err(DocuStructError::Validation(_))));
}

/// DocuStructErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        DocuStructError::Config("テスト設定エラー".to_string()),
        DocuStructError::MissingApiKey,
        DocuStructError::FileNotFound("scan.pdf".to_string()),
        DocuStructError::UnsupportedFormat("gif".to_string()),
        DocuStructError::Validation("Upload a file first.".to_string()),
        DocuStructError::IndexOutOfRange { index: 9, len: 3 },
        DocuStructError::InvalidPhase { operation: "add_field", phase: "review" },
        DocuStructError::RemoteService("HTTP 500".to_string()),
        DocuStructError::MalformedResponse("not json".to_string()),
        DocuStructError::Export("書き込み失敗".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// ユーザー向けメッセージは英語で統一
#[test]
fn test_error_messages_are_english() {
    let io_err: DocuStructError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
    let errors = vec![
        DocuStructError::Config("home directory not found".to_string()),
        DocuStructError::FileNotFound("scan.pdf".to_string()),
        DocuStructError::Export("xlsx".to_string()),
        DocuStructError::Prompt("not a terminal".to_string()),
        io_err,
    ];

    for err in errors {
        let display = err.to_string();
        assert!(display.is_ascii(), "英語以外のメッセージ: {}", display);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = DocuStructError::MissingApiKey.to_string();

    assert!(display.contains("GOOGLE_API_KEY"));
    assert!(display.contains("docustruct config"));
}

/// 検証エラーはメッセージをそのまま表示
#[test]
fn test_validation_message_verbatim() {
    let err = DocuStructError::Validation("Add at least one field.".into());
    assert_eq!(err.to_string(), "Add at least one field.");
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: DocuStructError = io_err.into();

    assert!(matches!(err, DocuStructError::Io(_)));
    assert!(err.to_string().contains("IO"));
    assert!(!err.is_user_recoverable());
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: DocuStructError = json_err.into();

    assert!(matches!(err, DocuStructError::JsonParse(_)));
}

/// モデル出力の解析失敗は MalformedResponse に分類
#[test]
fn test_common_parse_error_conversion() {
    let common_err = docustruct_common::Error::Parse("unexpected token".to_string());
    let err: DocuStructError = common_err.into();

    assert!(matches!(err, DocuStructError::MalformedResponse(_)));
    assert!(err.is_user_recoverable());
}

/// それ以外の common::Error は透過的に包む
#[test]
fn test_common_error_transparent() {
    let common_err = docustruct_common::Error::UnknownPreset("Invoice".to_string());
    let err: DocuStructError = common_err.into();

    assert!(matches!(err, DocuStructError::Common(_)));
    assert!(err.to_string().contains("Invoice"));
}
