//! Prompt context building (C6), LLM orchestration (C7), response
//! validation (C8), and the `SendPrompt` capability for the rumi video
//! fusion engine.

pub mod context;
pub mod error;
pub mod orchestrator;
pub mod send_prompt;
pub mod validator;

pub use context::{build_context, PromptContext};
pub use error::{LlmError, LlmResult};
pub use orchestrator::{AnalysisResult, CancellationToken, Orchestrator, ANALYSIS_ORDER};
pub use send_prompt::{HttpSendPrompt, SendPrompt, SendPromptResult};
pub use validator::{validate, ValidatedResponse, CANONICAL_BLOCKS};

pub use rumi_core::lexicons;
