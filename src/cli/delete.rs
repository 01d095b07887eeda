use std::path::PathBuf;

use tracing::instrument;
use uuid::Uuid;
use vms::client::PublishError;

use crate::cli::{prompt_to_proceed, publisher, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// Logical id of the record to delete
    id: Uuid,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (profile, mut publisher) = publisher(root)?;

        let revisions = publisher.revisions_of(&profile, self.id)?;
        let Some((_, kind)) = revisions.first() else {
            return Err(PublishError::NotFound(self.id).into());
        };

        if !self.yes {
            println!(
                "Will hide {} post(s) of {} {}:",
                revisions.len(),
                kind.name(),
                self.id
            );
            for (post_id, _) in &revisions {
                println!("  • {post_id}");
            }
            if !prompt_to_proceed("Proceed?")? {
                println!("Cancelled");
                return Ok(());
            }
        }

        let hidden = publisher.delete(&profile, self.id)?;
        println!(
            "{}",
            format!("✅ Deleted {} ({hidden} post(s) hidden)", self.id).success()
        );
        Ok(())
    }
}
