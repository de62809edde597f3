pub mod app;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod profile;
pub mod runtime;
pub mod scoring;
pub mod source;
pub mod sources;
pub mod xref;
