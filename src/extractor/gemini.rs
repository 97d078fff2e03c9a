//! Gemini API連携
//!
//! 1. Files API に文書をアップロード（resumable upload）
//! 2. generateContent にプロンプト + ファイル参照 + 出力スキーマを送信
//! 3. レスポンステキストを JSON としてパース
//!
//! リトライなし・タイムアウト上書きなしの1往復。

use super::ExtractionBackend;
use crate::config::Config;
use crate::document::SourceDocument;
use crate::error::{DocuStructError, Result};
use docustruct_common::{
    instruction_prompt, parse_extraction_response, DocumentType, ExtractionResult,
    ExtractionSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const RESPONSE_MIME_TYPE: &str = "application/json";

/// APIキーはURLに載せずヘッダーで送る（エラー表示・ログに残さない）
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini APIリクエスト
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    FileData { file_data: FileData },
}

#[derive(Debug, Serialize)]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseJsonSchema")]
    response_json_schema: Value,
}

/// Gemini APIレスポンス
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

/// アップロード済みファイル（リモート側リソース）
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub uri: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 設定からクライアントを生成（APIキー未設定ならエラー）
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Ok(Self::with_api_key(config, api_key))
    }

    pub fn with_api_key(config: &Config, api_key: impl Into<String>) -> Self {
        Self::new(api_key, config.model.clone(), config.api_base_url.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// 文書を Files API にアップロード
    pub async fn upload_file(&self, document: &SourceDocument) -> Result<UploadedFile> {
        let bytes = document.read_bytes()?;
        let size = bytes.len();

        tracing::info!(file = %document.file_name(), bytes = size, "uploading document");

        // 1. アップロードセッション開始
        let start = self
            .http
            .post(self.upload_url())
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", document.mime_type())
            .json(&json!({ "file": { "display_name": document.file_name() } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let session_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| DocuStructError::RemoteService("upload session URL missing".into()))?;

        // 2. 本体送信 + 確定
        let finish = self
            .http
            .post(session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let finish = check_status(finish).await?;

        let uploaded: UploadResponse = finish
            .json()
            .await
            .map_err(|e| DocuStructError::MalformedResponse(format!("upload response: {}", e)))?;

        tracing::info!(name = %uploaded.file.name, "document uploaded");
        Ok(uploaded.file)
    }

    /// generateContent を呼び出し、レスポンステキストを返す
    async fn generate_content(&self, request: &GeminiRequest) -> Result<String> {
        tracing::info!(model = %self.model, "requesting structured extraction");

        let resp = self
            .http
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let response: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| DocuStructError::MalformedResponse(format!("generateContent response: {}", e)))?;

        let text = response_text(response)?;
        tracing::debug!(chars = text.len(), "received model response");
        Ok(text)
    }
}

impl ExtractionBackend for GeminiClient {
    async fn extract(
        &self,
        document: &SourceDocument,
        schema: &ExtractionSchema,
        document_type: DocumentType,
    ) -> Result<ExtractionResult> {
        let prompt = instruction_prompt(document_type);
        let file = self.upload_file(document).await?;
        let request = build_request(prompt, &file, document.mime_type(), schema);
        let text = self.generate_content(&request).await?;
        Ok(parse_extraction_response(&text)?)
    }
}

fn build_request(
    prompt: &str,
    file: &UploadedFile,
    fallback_mime_type: &str,
    schema: &ExtractionSchema,
) -> GeminiRequest {
    let mime_type = file
        .mime_type
        .clone()
        .unwrap_or_else(|| fallback_mime_type.to_string());

    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text { text: prompt.to_string() },
                Part::FileData {
                    file_data: FileData {
                        mime_type,
                        file_uri: file.uri.clone(),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            response_json_schema: schema.normalized(),
        },
    }
}

/// 最初の候補のテキストパートを連結
fn response_text(response: GeminiResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(DocuStructError::MalformedResponse("empty response".into()));
    }
    Ok(text)
}

/// 2xx 以外はステータスと本文をそのままエラーにする
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(%status, "remote service returned an error");
    Err(DocuStructError::RemoteService(format!("{}: {}", status, body.trim())))
}
