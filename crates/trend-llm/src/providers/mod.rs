//! Oracle provider implementations

pub mod openai;

pub use openai::{OpenAIConfig, OpenAIProvider};
