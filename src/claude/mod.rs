//! Claude API integration module
//!
//! Provides API key management and an HTTP client for Claude's
//! messages API. Quiz generation is the only caller.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use auth::ApiKeyManager;
pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use models::{ClaudeModel, CreateMessageRequest, Message, Role};
