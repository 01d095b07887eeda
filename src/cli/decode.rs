use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::instrument;
use vms::{DomainRecord, Post};

use super::{terminal::Colorize, OutputFormat};

#[derive(Debug, Parser)]
#[command(about = "Decode a single post read from a JSON file")]
pub struct Decode {
    /// Path to the post JSON, `-` for stdin
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Decode {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn run(self) -> anyhow::Result<()> {
        let content = if self.path.as_os_str() == "-" {
            std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
        } else {
            std::fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read {}", self.path.display()))?
        };
        let post: Post = serde_json::from_str(&content).context("Not a post")?;

        let record = DomainRecord::decode(&post)
            .with_context(|| format!("Post {} holds no valid record", post.id))?;

        match self.output {
            OutputFormat::Json => {
                let out = serde_json::json!({
                    "kind": record.kind().name(),
                    "tag": record.tag(),
                    "version": record.version(),
                    "id": record.id(),
                    "fingerprint": record.fingerprint(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Table => {
                println!(
                    "{}",
                    format!(
                        "✅ {} {} (version {})",
                        record.kind().name(),
                        record.id(),
                        record.version()
                    )
                    .success()
                );
                println!("{record:#?}");
            }
        }
        Ok(())
    }
}
