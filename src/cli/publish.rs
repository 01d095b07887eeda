use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::instrument;
use uuid::Uuid;
use vms::{
    CauseForm, DomainRecord, FileUpload, GoalForm, OpportunityForm, Publication, VhrLogForm,
};

use crate::cli::{publisher, terminal::Colorize};

#[derive(Debug, clap::Subcommand)]
pub enum Publish {
    /// Publish a fundraising cause
    Cause(CauseArgs),

    /// Publish a volunteer opportunity
    Opportunity(OpportunityArgs),

    /// Publish a VHR goal for your organization
    Goal(GoalArgs),

    /// Ask an organization to verify volunteer hours
    Vhr(VhrArgs),
}

#[derive(Debug, clap::Args)]
pub struct CauseArgs {
    /// Cause name
    #[arg(long)]
    name: String,

    /// Category
    #[arg(long)]
    category: String,

    /// Token address contributions are made in (default: from config)
    #[arg(long)]
    currency: Option<String>,

    /// Suggested contribution
    #[arg(long)]
    contribution: String,

    /// Fundraising goal
    #[arg(long)]
    goal: String,

    /// Receiving wallet address
    #[arg(long)]
    recipient: String,

    /// Description
    #[arg(long)]
    description: String,

    /// Country
    #[arg(long)]
    country: String,

    /// Province or state
    #[arg(long)]
    province: String,

    /// City
    #[arg(long)]
    city: String,

    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,

    /// Save as a draft instead of publishing
    #[arg(long)]
    draft: bool,
}

#[derive(Debug, clap::Args)]
pub struct OpportunityArgs {
    /// Opportunity name
    #[arg(long)]
    name: String,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    end: String,

    /// Expected hours per week
    #[arg(long)]
    hours: String,

    /// Category
    #[arg(long)]
    category: String,

    /// Website
    #[arg(long)]
    website: String,

    /// Description
    #[arg(long)]
    description: String,

    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,

    /// Volunteers must apply before joining
    #[arg(long)]
    application_required: bool,

    /// Save as a draft instead of publishing
    #[arg(long)]
    draft: bool,
}

#[derive(Debug, clap::Args)]
pub struct GoalArgs {
    /// Target hours
    #[arg(long)]
    goal: String,

    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    date: String,
}

#[derive(Debug, clap::Args)]
pub struct VhrArgs {
    /// Logical id of the opportunity the hours were spent on
    #[arg(long)]
    opportunity: Uuid,

    /// Hours to verify
    #[arg(long)]
    hours: String,

    /// Message for the organization
    #[arg(long, default_value = "")]
    comments: String,
}

pub const fn publication(draft: bool) -> Publication {
    if draft {
        Publication::Draft
    } else {
        Publication::Published
    }
}

/// Upload `image`, if given, returning its URL or an empty string.
pub fn upload_image(client: &impl FileUpload, image: Option<&Path>) -> anyhow::Result<String> {
    let Some(path) = image else {
        return Ok(String::new());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let url = client.upload(&bytes)?;
    tracing::info!(%url, "uploaded image");
    Ok(url)
}

impl Publish {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (profile, mut publisher) = publisher(root)?;
        let id = Uuid::new_v4();

        let record: DomainRecord = match self {
            Self::Cause(args) => {
                let image_url = upload_image(publisher.client(), args.image.as_deref())?;
                let currency = args
                    .currency
                    .unwrap_or_else(|| publisher.client().config().default_currency().to_string());
                CauseForm {
                    name: args.name,
                    category: args.category,
                    currency,
                    contribution: args.contribution,
                    goal: args.goal,
                    recipient: args.recipient,
                    description: args.description,
                    country: args.country,
                    province: args.province,
                    city: args.city,
                    image_url,
                }
                .into_record(id, publication(args.draft))?
                .into()
            }
            Self::Opportunity(args) => {
                let image_url = upload_image(publisher.client(), args.image.as_deref())?;
                OpportunityForm {
                    name: args.name,
                    start_date: args.start,
                    end_date: args.end,
                    hours_per_week: args.hours,
                    category: args.category,
                    website: args.website,
                    description: args.description,
                    image_url,
                    application_required: args.application_required,
                }
                .into_record(id, publication(args.draft))?
                .into()
            }
            Self::Goal(args) => GoalForm {
                goal: args.goal,
                goal_date: args.date,
            }
            .into_record(id)?
            .into(),
            Self::Vhr(args) => VhrLogForm {
                opportunity_id: args.opportunity,
                hours: args.hours,
                comments: args.comments,
            }
            .into_record(id)?
            .into(),
        };

        let post_id = publisher.publish(&profile, &record)?;

        println!(
            "{}",
            format!("Published {} {id} as post {post_id}", record.kind().name()).success()
        );
        Ok(())
    }
}
