//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use docchat_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// Build a prompt from a definition and template data.
///
/// Both the system instruction (when present) and the user template are
/// rendered against the same data. HTML escaping is disabled: page text is
/// passed to the model verbatim.
///
/// # Example
/// ```no_run
/// use docchat_prompt::{build_prompt, PromptDefinition};
/// use serde_json::json;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let built = build_prompt(&def, &json!({ "query": "What is Rust?" }))?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt<T: Serialize>(
    definition: &PromptDefinition,
    data: &T,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("user", &definition.template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let user = handlebars
        .render("user", data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    let system = match definition.system {
        Some(ref system) => {
            handlebars
                .register_template_string("system", system)
                .map_err(|e| {
                    AppError::Prompt(format!("Failed to register system template: {}", e))
                })?;
            let rendered = handlebars
                .render("system", data)
                .map_err(|e| AppError::Prompt(format!("Failed to render system template: {}", e)))?;
            Some(rendered)
        }
        None => None,
    };

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            origin: definition.origin,
            expects_json: definition.output.is_json(),
        },
    })
}
