//! Text-generation backend integration for SQL generation and repair.
//!
//! The correction loop asks a [`SqlGenerator`] for two things:
//! - An initial SQL candidate for a question, given the schema context
//! - A repaired candidate, given the failed SQL and the database error
//!
//! Failing to reach the backend is reported as a [`ConnectivityError`],
//! distinct from any SQL text, so the loop can stop instead of retrying.
//!
//! # Supported Providers
//!
//! - **Ollama** - Local models through `/api/generate` (requires Ollama running)
//! - **Mock** - Scripted responses for tests
//!
//! # Example
//!
//! ```no_run
//! use askdb::{OllamaProvider, SqlGenerator};
//!
//! let provider = OllamaProvider::new().unwrap();
//! let sql = provider.generate_initial("show all users", "CREATE TABLE users (\n    id INTEGER\n);");
//! ```

mod mock;
mod ollama;
pub mod prompts;
mod provider;

pub use mock::{GenerationRequest, MockProvider};
pub use ollama::OllamaProvider;
pub use provider::{ConnectivityError, GenerationResult, LlmConfig, SqlGenerator};
