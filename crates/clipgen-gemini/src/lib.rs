//! Content strategy client.
//!
//! Builds the prompt and response schema from an [`AggregateRequest`],
//! calls Gemini `generateContent`, and validates the returned JSON against
//! the strategy contract before attaching the locally derived durations.
//!
//! [`AggregateRequest`]: clipgen_models::AggregateRequest

pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod schema;


pub use client::{GeminiClient, StrategyClient};
pub use config::GeminiConfig;
pub use error::{StrategyError, StrategyResult};
pub use prompt::{build_prompt, MAX_USER_PROMPT_CHARS};
pub use schema::{parse_strategy_text, response_schema};
