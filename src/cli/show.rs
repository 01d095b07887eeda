use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use vms::{domain::Location, DomainRecord};

use super::{load_directory, terminal::Colorize, OutputFormat};

#[derive(Debug, Parser)]
#[command(about = "Display a record and its revision history")]
pub struct Show {
    /// Logical id of the record
    id: Uuid,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = load_directory(root)?;
        let timeline = directory.timeline();

        let Some(current) = timeline.find(self.id) else {
            anyhow::bail!("Record {} not found", self.id);
        };
        let history = timeline.history(self.id);

        match self.output {
            OutputFormat::Json => {
                let revisions: Vec<_> = history
                    .iter()
                    .map(|revision| {
                        json!({
                            "postId": revision.post_id,
                            "createdAt": revision.created_at,
                            "isHidden": revision.is_hidden,
                            "fingerprint": revision.record.fingerprint(),
                        })
                    })
                    .collect();
                let out = json!({
                    "id": self.id,
                    "kind": current.record.kind().name(),
                    "version": current.record.version(),
                    "profile": current.profile,
                    "attributes": current.record.to_attributes(),
                    "revisions": revisions,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Table => {
                let record = &current.record;
                let mut title = format!("# {} {}", record.kind().name(), self.id);
                if record.is_draft() {
                    title.push_str(" (draft)");
                }
                println!("{title}");
                if let Some(name) = display_name(record) {
                    println!("{name}");
                }
                println!();

                println!("{}", "Metadata".dim());
                println!("  Type:      {}", record.tag());
                println!("  Version:   {}", record.version());
                println!("  Author:    {}", current.profile.handle);
                if let DomainRecord::Cause(cause) = record {
                    let currency = directory.config().currency_label(&cause.currency);
                    println!("  Currency:  {currency}");
                    let location = Location::format(&cause.location);
                    if !location.is_empty() {
                        println!("  Location:  {location}");
                    }
                }
                println!();

                println!("{}", "Attributes".dim());
                for attribute in record.to_attributes().iter().skip(3) {
                    println!("  {:<20} {}", attribute.trait_type, attribute.value);
                }
                println!();

                println!("{}", format!("Revisions ({})", history.len()).dim());
                for revision in &history {
                    let mut line = format!(
                        "  {}  {}",
                        revision.created_at.format("%Y-%m-%d %H:%M"),
                        revision.post_id
                    );
                    if revision.is_hidden {
                        line.push_str(&" hidden".warning());
                    }
                    if revision.post_id == current.post_id {
                        line.push_str(&" current".success());
                    }
                    println!("{line}");
                }
            }
        }
        Ok(())
    }
}

fn display_name(record: &DomainRecord) -> Option<&str> {
    match record {
        DomainRecord::Cause(cause) => Some(&cause.name),
        DomainRecord::Opportunity(opportunity) => Some(&opportunity.name),
        DomainRecord::Goal(_) | DomainRecord::VhrLog(_) => None,
    }
}
