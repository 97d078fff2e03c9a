pub mod cli;
pub mod config;
pub mod display;
pub mod document;
pub mod error;
pub mod export;
pub mod extractor;
pub mod interactive;
pub mod oneshot;
pub mod workflow;
