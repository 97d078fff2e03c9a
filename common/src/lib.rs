//! DocuStruct Common Library
//!
//! CLIと対話セッションで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod schema;
pub mod prompts;
pub mod parser;
pub mod projector;
pub mod export;

pub use types::{seed_defaults, DocumentType, ExtractionResult, FieldSpec};
pub use error::{Error, Result};
pub use schema::{build_schema, strip_unsupported_keywords, ExtractionSchema, SchemaSlot};
pub use prompts::instruction_prompt;
pub use parser::{extract_json, parse_extraction_response};
pub use projector::{project, to_delimited_text, to_json, Projection, Table};
