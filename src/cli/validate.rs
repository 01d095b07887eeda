use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tracing::instrument;

use super::{load_directory, terminal::Colorize, OutputFormat};

#[derive(Debug, Parser)]
#[command(about = "Check that every post carrying a record tag decodes")]
pub struct Validate {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = load_directory(root)?;
        let timeline = directory.timeline();
        let skipped = timeline.skipped();

        match self.output {
            OutputFormat::Json => {
                let out = json!({
                    "posts": directory.posts().len(),
                    "records": timeline.revisions().len(),
                    "invalid": skipped
                        .iter()
                        .map(|s| json!({ "postId": s.post_id, "error": s.error.to_string() }))
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Table if self.quiet => {}
            OutputFormat::Table => {
                if skipped.is_empty() {
                    println!(
                        "{}",
                        format!(
                            "✅ {} post(s), {} record revision(s), all valid",
                            directory.posts().len(),
                            timeline.revisions().len()
                        )
                        .success()
                    );
                } else {
                    for s in skipped {
                        eprintln!("{} {}", s.post_id.error(), s.error);
                    }
                }
            }
        }

        if !skipped.is_empty() {
            anyhow::bail!("{} invalid post(s)", skipped.len());
        }
        Ok(())
    }
}
