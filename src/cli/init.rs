use std::path::Path;

use anyhow::Context;
use tracing::instrument;
use vms::Directory;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    pub fn run(&self, root: &Path) -> anyhow::Result<()> {
        let directory = Directory::new(root.to_path_buf());
        if directory.config_path().exists() {
            anyhow::bail!(
                "Post store already initialized (found {})",
                directory.config_path().display()
            );
        }

        directory
            .init()
            .with_context(|| format!("Failed to initialize {}", root.display()))?;

        println!(
            "{}",
            format!("Initialized post store in {}", root.display()).success()
        );
        println!("  Created: .vms/config.toml");
        println!("  Created: posts/");
        println!("  Created: blobs/");
        println!();
        println!("Next steps:");
        println!("  vms login --id 0x01 --handle your.lens --owner 0x... --accept-cookies");
        Ok(())
    }
}
