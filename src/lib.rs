//! Console Relay API Library
//!
//! This library backs the browser console with two relay pipelines: image →
//! vision-model number extraction and city → firm-discovery webhook, plus
//! the pure aggregation, export, and table-view logic around them.
//!
//! # Modules
//!
//! - `cache_validator`: Checksum validation for cached webhook payloads.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `extraction`: Row arithmetic, edit policies, and model-reply parsing.
//! - `export`: Firm-record flattening and CSV/XLSX/PDF/JSON artifacts.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `services`: External service clients (Gemini, discovery webhook).
//! - `table`: Sortable, paginated firm-record view.

pub mod cache_validator;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod export;
pub mod handlers;
pub mod models;
pub mod services;
pub mod table;
