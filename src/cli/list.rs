use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use vms::{
    domain::Location,
    query::{self, CauseQuery, CauseSort, OpportunityQuery, OpportunitySort},
    storage::Entry,
    Attribute, Config, DomainRecord, PostTag, RecordKind, Timeline,
};

use crate::cli::{load_directory, signed_in, terminal, terminal::Colorize, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum List {
    /// List causes
    Causes(ListCauses),

    /// List volunteer opportunities
    Opportunities(ListOpportunities),

    /// List VHR goals
    Goals(ListGoals),

    /// List VHR log requests
    Vhr(ListVhr),

    /// List your bookmarks
    Bookmarks(ListBookmarks),
}

/// Filters shared by the cause and opportunity listings.
#[derive(Debug, Args)]
pub struct Filters {
    /// Only this category
    #[arg(long)]
    category: Option<String>,

    /// Case-insensitive substring of the name or description
    #[arg(long)]
    search: Option<String>,

    /// Include drafts
    #[arg(long)]
    drafts: bool,

    /// List the categories in use instead of records
    #[arg(long)]
    categories: bool,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ListCauses {
    #[command(flatten)]
    filters: Filters,

    /// Sort field
    #[arg(long, value_enum)]
    sort: Option<CauseSortField>,
}

#[derive(Debug, Args)]
pub struct ListOpportunities {
    #[command(flatten)]
    filters: Filters,

    /// Sort field
    #[arg(long, value_enum)]
    sort: Option<OpportunitySortField>,
}

#[derive(Debug, Args)]
pub struct ListGoals {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ListVhr {
    /// Only requests for this opportunity
    #[arg(long)]
    opportunity: Option<Uuid>,

    /// Show pending hours per opportunity instead of individual requests
    #[arg(long)]
    totals: bool,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ListBookmarks {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CauseSortField {
    Name,
    Goal,
}

impl From<CauseSortField> for CauseSort {
    fn from(field: CauseSortField) -> Self {
        match field {
            CauseSortField::Name => Self::Name,
            CauseSortField::Goal => Self::Goal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OpportunitySortField {
    Start,
    End,
    Hours,
    Name,
}

impl From<OpportunitySortField> for OpportunitySort {
    fn from(field: OpportunitySortField) -> Self {
        match field {
            OpportunitySortField::Start => Self::StartDate,
            OpportunitySortField::End => Self::EndDate,
            OpportunitySortField::Hours => Self::Hours,
            OpportunitySortField::Name => Self::Name,
        }
    }
}

impl List {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = load_directory(root.clone())?;
        let timeline = directory.timeline();

        match self {
            Self::Causes(args) => list_causes(&timeline, directory.config(), &args),
            Self::Opportunities(args) => list_opportunities(&timeline, &args),
            Self::Goals(args) => list_goals(&timeline, args.output),
            Self::Vhr(args) => list_vhr(&timeline, &args),
            Self::Bookmarks(args) => {
                let (profile, _) = signed_in(&root)?;
                list_bookmarks(&timeline, &profile.id, args.output)
            }
        }
    }
}

fn list_causes(timeline: &Timeline, config: &Config, args: &ListCauses) -> anyhow::Result<()> {
    let causes = timeline.causes();
    if args.filters.categories {
        return print_categories(&query::categories(causes.iter().map(|c| c.record)));
    }

    let query = CauseQuery {
        category: args.filters.category.clone(),
        search: args.filters.search.clone(),
        sort: args.sort.map(Into::into).unwrap_or_default(),
        include_drafts: args.filters.drafts,
    };
    let causes = query.apply(causes);

    let headers = ["ID", "NAME", "CATEGORY", "GOAL", "LOCATION", "ORGANIZATION"];
    let rows = causes
        .iter()
        .map(|cause| {
            vec![
                short_id(cause.id, cause.publication.is_draft()),
                cause.name.clone(),
                cause.category.clone(),
                format!("{} {}", cause.goal, config.currency_label(&cause.currency)),
                Location::format(&cause.location),
                cause.revision.profile.handle.clone(),
            ]
        })
        .collect();

    render(args.filters.output, &headers, rows, &causes)
}

fn list_opportunities(timeline: &Timeline, args: &ListOpportunities) -> anyhow::Result<()> {
    let opportunities = timeline.opportunities();
    if args.filters.categories {
        return print_categories(&query::categories(opportunities.iter().map(|o| o.record)));
    }

    let query = OpportunityQuery {
        category: args.filters.category.clone(),
        search: args.filters.search.clone(),
        sort: args.sort.map(Into::into).unwrap_or_default(),
        include_drafts: args.filters.drafts,
    };
    let opportunities = query.apply(opportunities);

    let headers = ["ID", "NAME", "CATEGORY", "START", "END", "HOURS/WEEK", "ORGANIZATION"];
    let rows = opportunities
        .iter()
        .map(|opportunity| {
            vec![
                short_id(opportunity.id, opportunity.publication.is_draft()),
                opportunity.name.clone(),
                opportunity.category.clone(),
                opportunity.start_date.to_string(),
                opportunity.end_date.to_string(),
                opportunity.hours_per_week.to_string(),
                opportunity.revision.profile.handle.clone(),
            ]
        })
        .collect();

    render(args.filters.output, &headers, rows, &opportunities)
}

fn list_goals(timeline: &Timeline, output: OutputFormat) -> anyhow::Result<()> {
    let goals = timeline.goals();
    let headers = ["ID", "ORGANIZATION", "GOAL", "BY"];
    let rows = goals
        .iter()
        .map(|goal| {
            vec![
                short_id(goal.id, false),
                goal.revision.profile.handle.clone(),
                goal.goal.to_string(),
                goal.goal_date.to_string(),
            ]
        })
        .collect();
    render(output, &headers, rows, &goals)
}

fn list_vhr(timeline: &Timeline, args: &ListVhr) -> anyhow::Result<()> {
    let logs: Vec<_> = timeline
        .vhr_logs()
        .into_iter()
        .filter(|log| args.opportunity.is_none_or(|id| log.opportunity_id == id))
        .collect();

    if args.totals {
        let totals = query::hours_by_opportunity(logs.iter().map(|log| log.record));
        match args.output {
            OutputFormat::Json => {
                let out: Vec<_> = totals
                    .iter()
                    .map(|(id, hours)| json!({ "opportunityId": id, "hours": hours }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Table => {
                let rows = totals
                    .iter()
                    .map(|(id, hours)| vec![opportunity_name(timeline, *id), hours.to_string()])
                    .collect();
                print_table(&["OPPORTUNITY", "PENDING HOURS"], rows);
            }
        }
        return Ok(());
    }

    let headers = ["ID", "VOLUNTEER", "OPPORTUNITY", "HOURS", "COMMENTS"];
    let rows = logs
        .iter()
        .map(|log| {
            vec![
                short_id(log.id, false),
                log.revision.profile.handle.clone(),
                opportunity_name(timeline, log.opportunity_id),
                log.hours_to_verify.to_string(),
                log.comments.clone(),
            ]
        })
        .collect();
    render(args.output, &headers, rows, &logs)
}

fn list_bookmarks(
    timeline: &Timeline,
    profile_id: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let targets: Vec<(String, Option<RecordKind>, Option<&DomainRecord>)> = timeline
        .bookmarks(profile_id)
        .into_iter()
        .filter_map(|post| {
            let target = post.comment_on.clone()?;
            let kind = post.known_tags().find_map(PostTag::bookmarked);
            let record = bookmarked_record(timeline, &target);
            Some((target, kind, record))
        })
        .collect();

    match output {
        OutputFormat::Json => {
            let out: Vec<_> = targets
                .iter()
                .map(|(post_id, kind, record)| {
                    json!({
                        "postId": post_id,
                        "kind": kind.map(RecordKind::name),
                        "attributes": record.map(DomainRecord::to_attributes),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            let rows = targets
                .iter()
                .map(|(post_id, kind, record)| {
                    let name = match record {
                        Some(DomainRecord::Cause(cause)) => cause.name.clone(),
                        Some(DomainRecord::Opportunity(o)) => o.name.clone(),
                        Some(_) | None => "(deleted)".dim(),
                    };
                    let kind = kind.map_or("", RecordKind::name);
                    vec![post_id.clone(), kind.to_string(), name]
                })
                .collect();
            print_table(&["POST", "KIND", "NAME"], rows);
        }
    }
    Ok(())
}

/// The current state of the record `post_id` belongs to, if the post was
/// published by the record's owner.
fn bookmarked_record<'a>(timeline: &'a Timeline, post_id: &str) -> Option<&'a DomainRecord> {
    let revision = timeline
        .revisions()
        .iter()
        .find(|revision| revision.post_id == post_id)?;
    let id = revision.record.id();
    timeline
        .owner(id)
        .filter(|owner| owner.id == revision.profile.id)
        .and(timeline.find(id))
        .map(|current| &current.record)
}

fn opportunity_name(timeline: &Timeline, id: Uuid) -> String {
    match timeline.find(id).map(|revision| &revision.record) {
        Some(DomainRecord::Opportunity(opportunity)) => opportunity.name.clone(),
        _ => id.to_string(),
    }
}

/// The first block of a logical id, marked when the record is a draft.
fn short_id(id: Uuid, draft: bool) -> String {
    let short = id.to_string()[..8].to_string();
    if draft {
        format!("{short} {}", "(draft)".dim())
    } else {
        short
    }
}

fn print_categories(categories: &[String]) -> anyhow::Result<()> {
    for category in categories {
        println!("{category}");
    }
    Ok(())
}

fn render<T>(
    output: OutputFormat,
    headers: &[&str],
    rows: Vec<Vec<String>>,
    entries: &[Entry<'_, T>],
) -> anyhow::Result<()>
where
    T: Clone + Into<DomainRecord>,
{
    match output {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No records".dim());
            } else {
                print_table(headers, rows);
            }
        }
        OutputFormat::Json => {
            let out: Vec<_> = entries
                .iter()
                .map(|entry| {
                    let record: DomainRecord = entry.record.clone().into();
                    let attributes: Vec<Attribute> = record.to_attributes();
                    json!({
                        "postId": entry.revision.post_id,
                        "profile": entry.revision.profile.handle,
                        "createdAt": entry.revision.created_at,
                        "attributes": attributes,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// Print rows as aligned columns; narrow terminals get only the first two.
fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let columns = if terminal::is_narrow() {
        2.min(headers.len())
    } else {
        headers.len()
    };

    let mut widths: Vec<usize> = headers[..columns].iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header = line(headers[..columns].iter().map(ToString::to_string).collect());
    println!("{}", header.info());
    for row in rows {
        println!("{}", line(row.into_iter().take(columns).collect()));
    }
}
