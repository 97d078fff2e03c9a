use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocuStructError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key required. Set GOOGLE_API_KEY or run `docustruct config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: {0} (only PDF and PNG are accepted)")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Validation(String),

    #[error("Field index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("`{operation}` is not allowed in the {phase} phase")]
    InvalidPhase { operation: &'static str, phase: &'static str },

    #[error("Extraction failed: {0}")]
    RemoteService(String),

    #[error("Extraction returned malformed JSON: {0}")]
    MalformedResponse(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Input error: {0}")]
    Prompt(String),

    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(docustruct_common::Error),
}

impl DocuStructError {
    /// ユーザーが入力を直して再実行できるエラーか
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            DocuStructError::Validation(_)
                | DocuStructError::UnsupportedFormat(_)
                | DocuStructError::RemoteService(_)
                | DocuStructError::MalformedResponse(_)
        )
    }
}

impl From<docustruct_common::Error> for DocuStructError {
    fn from(err: docustruct_common::Error) -> Self {
        match err {
            // モデル出力の解析失敗は専用の分類に寄せる
            docustruct_common::Error::Parse(msg) => DocuStructError::MalformedResponse(msg),
            other => DocuStructError::Common(other),
        }
    }
}

impl From<reqwest::Error> for DocuStructError {
    fn from(err: reqwest::Error) -> Self {
        // リクエストURLは表示しない
        DocuStructError::RemoteService(err.without_url().to_string())
    }
}

impl From<dialoguer::Error> for DocuStructError {
    fn from(err: dialoguer::Error) -> Self {
        DocuStructError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DocuStructError>;
