use std::path::PathBuf;

use anyhow::Context;
use tracing::instrument;

use crate::cli::{publisher, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Bookmark {
    /// Id of the cause or opportunity post to bookmark
    post_id: String,
}

impl Bookmark {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (profile, mut publisher) = publisher(root)?;
        let target = publisher
            .client()
            .post(&self.post_id)
            .cloned()
            .with_context(|| format!("No post {}", self.post_id))?;

        let post_id = publisher.bookmark(&profile, &target)?;
        println!(
            "{}",
            format!("Bookmarked {} as post {post_id}", self.post_id).success()
        );
        Ok(())
    }
}
