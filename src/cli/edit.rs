use std::path::PathBuf;

use anyhow::Context;
use tracing::instrument;
use uuid::Uuid;
use vms::{client::Modified, CauseForm, DomainRecord, OpportunityForm, Publication};

use crate::cli::{publish::upload_image, publisher, terminal::Colorize};

#[derive(Debug, clap::Subcommand)]
pub enum Edit {
    /// Edit a cause; unset options keep their current value
    Cause(EditCause),

    /// Edit an opportunity; unset options keep their current value
    Opportunity(EditOpportunity),
}

/// Whether to move a record between draft and published.
#[derive(Debug, Clone, Copy, clap::Args)]
#[group(multiple = false)]
pub struct PublicationArgs {
    /// Turn the record into a draft
    #[arg(long)]
    draft: bool,

    /// Publish a draft
    #[arg(long)]
    publish: bool,
}

impl PublicationArgs {
    const fn apply(self, current: Publication) -> Publication {
        if self.draft {
            Publication::Draft
        } else if self.publish {
            Publication::Published
        } else {
            current
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct EditCause {
    /// Logical id of the cause
    id: Uuid,

    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    contribution: Option<String>,
    #[arg(long)]
    goal: Option<String>,
    #[arg(long)]
    recipient: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    province: Option<String>,
    #[arg(long)]
    city: Option<String>,

    /// Replace the image with this file
    #[arg(long)]
    image: Option<PathBuf>,

    #[command(flatten)]
    publication: PublicationArgs,
}

#[derive(Debug, clap::Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct EditOpportunity {
    /// Logical id of the opportunity
    id: Uuid,

    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    hours: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    description: Option<String>,

    /// Replace the image with this file
    #[arg(long)]
    image: Option<PathBuf>,

    /// Require volunteers to apply first
    #[arg(long, conflicts_with = "no_application")]
    application_required: bool,

    /// Let volunteers join without applying
    #[arg(long)]
    no_application: bool,

    #[command(flatten)]
    publication: PublicationArgs,
}

fn replace(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

impl Edit {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (profile, mut publisher) = publisher(root)?;
        let id = match &self {
            Self::Cause(args) => args.id,
            Self::Opportunity(args) => args.id,
        };

        let timeline = publisher.client().timeline();
        let current = timeline
            .find(id)
            .filter(|revision| revision.profile.id == profile.id)
            .with_context(|| format!("No record {id} published by {}", profile.handle))?;
        let previous = current.record.clone();

        let record: DomainRecord = match (self, &previous) {
            (Self::Cause(args), DomainRecord::Cause(cause)) => {
                let mut form = CauseForm::from(cause);
                replace(&mut form.name, args.name);
                replace(&mut form.category, args.category);
                replace(&mut form.currency, args.currency);
                replace(&mut form.contribution, args.contribution);
                replace(&mut form.goal, args.goal);
                replace(&mut form.recipient, args.recipient);
                replace(&mut form.description, args.description);
                replace(&mut form.country, args.country);
                replace(&mut form.province, args.province);
                replace(&mut form.city, args.city);
                if args.image.is_some() {
                    form.image_url = upload_image(publisher.client(), args.image.as_deref())?;
                }
                form.into_record(id, args.publication.apply(cause.publication))?
                    .into()
            }
            (Self::Opportunity(args), DomainRecord::Opportunity(opportunity)) => {
                let mut form = OpportunityForm::from(opportunity);
                replace(&mut form.name, args.name);
                replace(&mut form.start_date, args.start);
                replace(&mut form.end_date, args.end);
                replace(&mut form.hours_per_week, args.hours);
                replace(&mut form.category, args.category);
                replace(&mut form.website, args.website);
                replace(&mut form.description, args.description);
                if args.image.is_some() {
                    form.image_url = upload_image(publisher.client(), args.image.as_deref())?;
                }
                if args.application_required {
                    form.application_required = true;
                } else if args.no_application {
                    form.application_required = false;
                }
                form.into_record(id, args.publication.apply(opportunity.publication))?
                    .into()
            }
            (_, other) => anyhow::bail!("Record {id} is a {}", other.kind().name()),
        };

        match publisher.modify(&profile, &record, &previous)? {
            Modified::Published(post_id) => println!(
                "{}",
                format!("Published revision of {id} as post {post_id}").success()
            ),
            Modified::Unchanged => println!("{}", "Nothing changed".dim()),
        }
        Ok(())
    }
}
