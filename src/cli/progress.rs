use std::path::PathBuf;

use clap::Parser;
use tracing::instrument;
use vms::query::{active_postings, VhrProgress};

use super::{load_directory, signed_in, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Show VHR progress towards the latest goal")]
pub struct Progress {
    /// Profile to report on (default: the signed-in profile)
    #[arg(long)]
    profile: Option<String>,

    /// Verified hour balance; defaults to the hours requested in VHR logs
    #[arg(long)]
    balance: Option<f64>,
}

impl Progress {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let profile_id = match self.profile {
            Some(id) => id,
            None => signed_in(&root)?.0.id,
        };
        let directory = load_directory(root)?;
        let timeline = directory.timeline();

        let balance = self.balance.unwrap_or_else(|| {
            timeline
                .vhr_logs()
                .iter()
                .filter(|log| log.revision.profile.id == profile_id)
                .map(|log| log.hours_to_verify)
                .sum()
        });
        let goal = timeline.latest_goal(&profile_id).map_or_else(
            || f64::from(directory.config().default_vhr_goal()),
            |goal| goal.goal,
        );
        let progress = VhrProgress::new(balance, goal);

        println!("VHR balance: {balance}");
        println!("VHR goal:    {goal}");
        if progress.reached() {
            println!("{}", "🎉 Goal reached".success());
        } else {
            println!(
                "{}",
                format!(
                    "{:.1}% ({} hours to go)",
                    progress.percent(),
                    progress.remaining()
                )
                .info()
            );
        }
        println!(
            "Active postings: {}",
            active_postings(directory.posts(), &profile_id)
        );
        Ok(())
    }
}
