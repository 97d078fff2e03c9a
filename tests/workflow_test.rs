//! ワークフロー状態機械の統合テスト
//!
//! 抽出バックエンドをスクリプト化したものに差し替えて、
//! configure → review → configure の遷移を検証する。

use docustruct::document::SourceDocument;
use docustruct::error::{DocuStructError, Result};
use docustruct::extractor::ExtractionBackend;
use docustruct::workflow::{Phase, Session};
use docustruct_common::{DocumentType, ExtractionResult, ExtractionSchema};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use tempfile::tempdir;

/// 呼び出しを記録し、決められた応答を返すバックエンド
struct ScriptedBackend {
    response: std::result::Result<Value, String>,
    calls: Cell<usize>,
    last_fields: RefCell<Vec<String>>,
    last_type: Cell<Option<DocumentType>>,
}

impl ScriptedBackend {
    fn returning(value: Value) -> Self {
        Self {
            response: Ok(value),
            calls: Cell::new(0),
            last_fields: RefCell::new(Vec::new()),
            last_type: Cell::new(None),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            ..Self::returning(Value::Null)
        }
    }
}

impl ExtractionBackend for ScriptedBackend {
    async fn extract(
        &self,
        document: &SourceDocument,
        schema: &ExtractionSchema,
        document_type: DocumentType,
    ) -> Result<ExtractionResult> {
        assert!(document.path().exists(), "文書が一時保存されていない");
        self.calls.set(self.calls.get() + 1);
        *self.last_fields.borrow_mut() = schema.field_names().map(str::to_string).collect();
        self.last_type.set(Some(document_type));

        match &self.response {
            Ok(value) => Ok(ExtractionResult::new(value.clone())),
            Err(msg) => Err(DocuStructError::RemoteService(msg.clone())),
        }
    }
}

fn receipt_json() -> Value {
    json!({
        "merchant_name": "Corner Cafe",
        "transaction_date": "2024-05-01",
        "total_amount": "12.50",
        "tax_amount": "1.00",
        "payment_method": "VISA",
        "items_purchased": "Coffee, Bagel"
    })
}

// =============================================
// 正常系
// =============================================

#[tokio::test]
async fn test_submit_moves_to_review() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    session.select_preset("Receipt").unwrap();
    session.upload_document(b"\x89PNG\r\n", "receipt.png").unwrap();

    let backend = ScriptedBackend::returning(receipt_json());
    session.submit_extraction(&backend).await.unwrap();

    assert_eq!(session.phase_name(), "review");
    assert_eq!(backend.calls.get(), 1);
    assert_eq!(backend.last_type.get(), Some(DocumentType::Receipt));
    assert_eq!(backend.last_fields.borrow()[0], "merchant_name");
    assert_eq!(session.result().unwrap().as_value(), &receipt_json());
}

#[tokio::test]
async fn test_schema_skips_blank_fields() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    session.upload_document(b"%PDF-1.4", "form.pdf").unwrap();
    session.add_field().unwrap();
    session.edit_field(1, "  ", "ignored").unwrap();

    let backend = ScriptedBackend::returning(json!({}));
    session.submit_extraction(&backend).await.unwrap();

    let fields = backend.last_fields.borrow();
    assert_eq!(fields.len(), 5);
    assert!(!fields.iter().any(|f| f.trim().is_empty()));
}

#[tokio::test]
async fn test_reset_restores_initial_state() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    session.select_preset("Receipt").unwrap();
    let stored = session
        .upload_document(b"\x89PNG", "r.png")
        .unwrap()
        .path()
        .to_path_buf();

    session
        .submit_extraction(&ScriptedBackend::returning(receipt_json()))
        .await
        .unwrap();
    session.reset().unwrap();

    assert!(matches!(session.phase(), Phase::Configure));
    assert_eq!(session.document_type(), DocumentType::Form);
    assert_eq!(session.fields(), DocumentType::Form.default_fields().as_slice());
    assert!(session.document().is_none());
    assert!(session.result().is_none());
    assert!(!stored.exists(), "一時ファイルが削除されていない");
}

// =============================================
// 検証エラー（リモート呼び出しなし）
// =============================================

#[tokio::test]
async fn test_submit_without_document() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    let backend = ScriptedBackend::returning(json!({}));

    let err = session.submit_extraction(&backend).await.unwrap_err();
    assert!(matches!(err, DocuStructError::Validation(ref m) if m == "Upload a file first."));
    assert_eq!(backend.calls.get(), 0);
    assert_eq!(session.phase_name(), "configure");
}

#[tokio::test]
async fn test_submit_with_only_blank_fields() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    session.upload_document(b"\x89PNG", "a.png").unwrap();
    for i in 0..session.fields().len() {
        session.edit_field(i, "", "").unwrap();
    }
    let backend = ScriptedBackend::returning(json!({}));

    let err = session.submit_extraction(&backend).await.unwrap_err();
    assert!(matches!(err, DocuStructError::Validation(ref m) if m == "Add at least one field."));
    assert_eq!(backend.calls.get(), 0);
    assert!(session.result().is_none());
}

#[tokio::test]
async fn test_missing_document_reported_before_missing_fields() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    while !session.fields().is_empty() {
        session.remove_field(0).unwrap();
    }

    let err = session
        .submit_extraction(&ScriptedBackend::returning(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Upload a file first.");
}

// =============================================
// 失敗時は configure に留まる
// =============================================

#[tokio::test]
async fn test_remote_failure_stays_in_configure() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    session.upload_document(b"\x89PNG", "a.png").unwrap();
    let fields_before = session.fields().to_vec();

    let backend = ScriptedBackend::failing("503 Service Unavailable");
    let err = session.submit_extraction(&backend).await.unwrap_err();

    assert!(matches!(err, DocuStructError::RemoteService(_)));
    assert!(err.is_user_recoverable());
    assert_eq!(session.phase_name(), "configure");
    assert!(session.result().is_none());
    assert_eq!(session.fields(), fields_before.as_slice());
    assert!(session.document().is_some());

    // 再試行できる
    assert!(session.is_ready());
}

// =============================================
// review フェーズでの不正操作
// =============================================

#[tokio::test]
async fn test_configure_operations_rejected_in_review() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut session = Session::with_storage_dir(dir.path());
    session.upload_document(b"\x89PNG", "a.png").unwrap();
    let backend = ScriptedBackend::returning(json!({"first_name": "Ada"}));
    session.submit_extraction(&backend).await.unwrap();

    assert!(matches!(
        session.add_field(),
        Err(DocuStructError::InvalidPhase { operation: "add_field", phase: "review" })
    ));
    assert!(matches!(session.remove_field(0), Err(DocuStructError::InvalidPhase { .. })));
    assert!(matches!(session.select_preset("Receipt"), Err(DocuStructError::InvalidPhase { .. })));
    assert!(matches!(
        session.upload_document(b"\x89PNG", "b.png"),
        Err(DocuStructError::InvalidPhase { .. })
    ));
    assert!(matches!(
        session.submit_extraction(&backend).await,
        Err(DocuStructError::InvalidPhase { .. })
    ));
    assert_eq!(backend.calls.get(), 1);

    // 結果は変わらない
    assert_eq!(session.result().unwrap().as_value(), &json!({"first_name": "Ada"}));
}
