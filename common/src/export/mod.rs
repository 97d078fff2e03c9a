//! Export core modules shared by the CLI and the interactive session.

#[cfg(feature = "excel")]
pub mod excel_core;
