//! Prompt loader: workspace overrides first, built-in definitions second.

use crate::builtin::{builtin_ids, builtin_source};
use crate::types::{PromptDefinition, PromptListing, PromptOrigin};
use docchat_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Directory holding workspace prompt overrides.
fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".docchat").join("prompts")
}

/// Load a prompt definition by ID.
///
/// `<workspace>/.docchat/prompts/<id>.yml` wins over the built-in definition
/// of the same id.
///
/// # Example
/// ```no_run
/// use docchat_prompt::{load_prompt, SELECT_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), SELECT_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    let (contents, origin) = if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);
        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;
        (contents, PromptOrigin::Workspace)
    } else if let Some(yaml) = builtin_source(prompt_id) {
        (yaml.to_string(), PromptOrigin::Builtin)
    } else {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' is neither built in nor present at {:?}",
            prompt_id, prompt_file
        )));
    };

    let mut definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt '{}' ({}): {}",
            prompt_id,
            origin.as_str(),
            e
        ))
    })?;
    definition.origin = origin;

    validate_prompt(&definition)?;

    if definition.id != prompt_id {
        tracing::warn!(
            "Prompt file for '{}' declares id '{}'",
            prompt_id,
            definition.id
        );
    }

    tracing::debug!(
        "Loaded prompt: {} ({}, {})",
        definition.id,
        definition.title,
        origin.as_str()
    );

    Ok(definition)
}

/// List built-in and workspace prompt ids, sorted by id.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<PromptListing>> {
    let mut listings: Vec<PromptListing> = builtin_ids()
        .map(|id| PromptListing {
            id: id.to_string(),
            origin: PromptOrigin::Builtin,
        })
        .collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("yml") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match listings.iter_mut().find(|l| l.id == stem) {
                Some(existing) => existing.origin = PromptOrigin::Workspace,
                None => listings.push(PromptListing {
                    id: stem.to_string(),
                    origin: PromptOrigin::Workspace,
                }),
            }
        }
    }

    listings.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(listings)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
