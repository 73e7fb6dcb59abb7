//! Prompt definitions compiled into the binary.

/// Prompt used to pick relevant pages.
pub const SELECT_PROMPT_ID: &str = "rag.select";

/// Prompt used to write the grounded answer.
pub const ANSWER_PROMPT_ID: &str = "rag.answer";

const BUILTIN_PROMPTS: [(&str, &str); 2] = [
    (SELECT_PROMPT_ID, include_str!("../prompts/rag.select.yml")),
    (ANSWER_PROMPT_ID, include_str!("../prompts/rag.answer.yml")),
];

/// YAML source of a built-in prompt.
pub fn builtin_source(prompt_id: &str) -> Option<&'static str> {
    BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, yaml)| *yaml)
}

/// Ids of all built-in prompts.
pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
    BUILTIN_PROMPTS.iter().map(|(id, _)| *id)
}
