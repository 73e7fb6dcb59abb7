//! Pages command handler.

use super::ingestor;
use clap::Args;
use docchat_core::{config::AppConfig, AppResult};

/// List the chunks extracted from the document
#[derive(Args, Debug)]
pub struct PagesCommand {
    /// Print the full text of each page
    #[arg(long)]
    pub full: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Characters of page text shown per line without `--full`.
const PREVIEW_CHARS: usize = 60;

impl PagesCommand {
    /// Execute the pages command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing pages command");

        let title = config.document_title();
        let ingested = ingestor(config)?.load(&title, &config.resolved_source()).await?;

        if self.json {
            let output = serde_json::json!({
                "title": title,
                "stats": ingested.stats,
                "chunks": ingested.chunks,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Document: {}", title);
        println!(
            "  Pages: {} ({} with text)",
            ingested.stats.pages_seen, ingested.stats.chunks_kept
        );
        println!("  Size: {} bytes", ingested.stats.bytes);
        println!();

        for chunk in &ingested.chunks {
            let chars = chunk.content.chars().count();
            if self.full {
                println!("{} ({} chars)\n{}\n", chunk.id, chars, chunk.content);
            } else {
                let preview: String = chunk.content.chars().take(PREVIEW_CHARS).collect();
                let ellipsis = if chars > PREVIEW_CHARS { "..." } else { "" };
                println!("{:<40} {:>6} chars  {}{}", chunk.id, chars, preview, ellipsis);
            }
        }

        Ok(())
    }
}
