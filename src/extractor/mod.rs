//! 抽出バックエンド
//!
//! ワークフローはこのトレイト越しにリモートサービスを呼ぶ。
//! テストではスクリプト化したバックエンドに差し替える。

mod gemini;

pub use gemini::{GeminiClient, UploadedFile};

use crate::document::SourceDocument;
use crate::error::Result;
use docustruct_common::{DocumentType, ExtractionResult, ExtractionSchema};

#[allow(async_fn_in_trait)]
pub trait ExtractionBackend {
    /// 文書とスキーマを送信し、構造化結果を1回の往復で取得する
    async fn extract(
        &self,
        document: &SourceDocument,
        schema: &ExtractionSchema,
        document_type: DocumentType,
    ) -> Result<ExtractionResult>;
}
