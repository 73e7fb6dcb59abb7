//! Prompt system for docchat.
//!
//! Both model calls of a turn are driven by prompt definitions:
//! - YAML definitions, built in or overridden per workspace
//! - Handlebars template rendering for the system and user messages

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{ANSWER_PROMPT_ID, SELECT_PROMPT_ID};
pub use loader::{list_prompts, load_prompt};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptListing, PromptOrigin,
    PromptOutputSpec,
};
