//! Prompts command handler.

use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_prompt::list_prompts;

/// List prompt ids and where each one is loaded from
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    /// Execute the prompts command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let prompts = list_prompts(&config.workspace)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&prompts)?);
            return Ok(());
        }

        for prompt in &prompts {
            println!("{:<20} {}", prompt.id, prompt.origin.as_str());
        }
        println!();
        println!(
            "Override a prompt by writing {}/prompts/<id>.yml",
            config.docchat_dir().display()
        );

        Ok(())
    }
}
