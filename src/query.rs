//! Filtering, sorting and aggregation over decoded records.
//!
//! These are the reads behind the dashboards: category pickers, search
//! boxes, sort drop-downs and VHR progress.

use std::{cmp::Ordering, collections::BTreeMap, ops::Deref};

use uuid::Uuid;

use crate::domain::{
    is_cause, is_cause_draft, is_opportunity, is_opportunity_draft, CauseMetadata,
    OpportunityMetadata, Post, VhrLogMetadata,
};

/// Records that belong to a category.
pub trait Categorized {
    /// The category, possibly empty.
    fn category(&self) -> &str;
}

impl Categorized for CauseMetadata {
    fn category(&self) -> &str {
        &self.category
    }
}

impl Categorized for OpportunityMetadata {
    fn category(&self) -> &str {
        &self.category
    }
}

/// Distinct non-empty categories of `records`, sorted.
pub fn categories<T, R>(records: impl IntoIterator<Item = R>) -> Vec<String>
where
    T: Categorized + ?Sized,
    R: Deref<Target = T>,
{
    let mut categories: Vec<String> = records
        .into_iter()
        .map(|record| record.category().trim().to_string())
        .filter(|category| !category.is_empty())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Case-insensitive substring match. An empty needle matches everything.
#[must_use]
pub fn matches_search(text: &str, needle: &str) -> bool {
    needle.is_empty() || text.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_category(category: &str, wanted: Option<&str>) -> bool {
    wanted.is_none_or(|wanted| category.eq_ignore_ascii_case(wanted))
}

/// Sort orders for opportunity lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpportunitySort {
    /// Keep the order records were given in.
    #[default]
    None,
    /// Earliest start first.
    StartDate,
    /// Earliest end first.
    EndDate,
    /// Fewest hours per week first.
    Hours,
    /// Alphabetical by name.
    Name,
}

/// Filters and ordering for opportunity lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpportunityQuery {
    /// Only this category, compared case-insensitively.
    pub category: Option<String>,
    /// Substring of the name or description.
    pub search: Option<String>,
    /// Ordering of the result.
    pub sort: OpportunitySort,
    /// Whether drafts are listed.
    pub include_drafts: bool,
}

impl OpportunityQuery {
    /// Filter and sort `opportunities`.
    pub fn apply<R>(&self, opportunities: impl IntoIterator<Item = R>) -> Vec<R>
    where
        R: Deref<Target = OpportunityMetadata>,
    {
        let search = self.search.as_deref().unwrap_or_default();
        let mut result: Vec<R> = opportunities
            .into_iter()
            .filter(|o| self.include_drafts || !o.publication.is_draft())
            .filter(|o| matches_category(&o.category, self.category.as_deref()))
            .filter(|o| matches_search(&o.name, search) || matches_search(&o.description, search))
            .collect();

        match self.sort {
            OpportunitySort::None => {}
            OpportunitySort::StartDate => result.sort_by_key(|o| o.start_date),
            OpportunitySort::EndDate => result.sort_by_key(|o| o.end_date),
            OpportunitySort::Hours => {
                result.sort_by(|a, b| a.hours_per_week.total_cmp(&b.hours_per_week));
            }
            OpportunitySort::Name => result.sort_by(|a, b| compare_names(&a.name, &b.name)),
        }
        result
    }
}

/// Sort orders for cause lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CauseSort {
    /// Keep the order records were given in.
    #[default]
    None,
    /// Alphabetical by name.
    Name,
    /// Smallest fundraising goal first.
    Goal,
}

/// Filters and ordering for cause lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CauseQuery {
    /// Only this category, compared case-insensitively.
    pub category: Option<String>,
    /// Substring of the name or description.
    pub search: Option<String>,
    /// Ordering of the result.
    pub sort: CauseSort,
    /// Whether drafts are listed.
    pub include_drafts: bool,
}

impl CauseQuery {
    /// Filter and sort `causes`.
    pub fn apply<R>(&self, causes: impl IntoIterator<Item = R>) -> Vec<R>
    where
        R: Deref<Target = CauseMetadata>,
    {
        let search = self.search.as_deref().unwrap_or_default();
        let mut result: Vec<R> = causes
            .into_iter()
            .filter(|c| self.include_drafts || !c.publication.is_draft())
            .filter(|c| matches_category(&c.category, self.category.as_deref()))
            .filter(|c| matches_search(&c.name, search) || matches_search(&c.description, search))
            .collect();

        match self.sort {
            CauseSort::None => {}
            CauseSort::Name => result.sort_by(|a, b| compare_names(&a.name, &b.name)),
            CauseSort::Goal => result.sort_by(|a, b| a.goal.total_cmp(&b.goal)),
        }
        result
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Verified hours measured against a goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VhrProgress {
    /// Hours verified so far.
    pub balance: f64,
    /// Target hours.
    pub goal: f64,
}

impl VhrProgress {
    /// Progress of `balance` hours towards `goal`.
    #[must_use]
    pub const fn new(balance: f64, goal: f64) -> Self {
        Self { balance, goal }
    }

    /// Hours still needed, never negative.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        (self.goal - self.balance).max(0.0)
    }

    /// Whether the goal has been met.
    #[must_use]
    pub fn reached(&self) -> bool {
        self.balance >= self.goal
    }

    /// Percentage of the goal reached, capped at 100.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.goal <= 0.0 {
            return 100.0;
        }
        (self.balance / self.goal * 100.0).clamp(0.0, 100.0)
    }
}

/// Hours awaiting verification, summed per opportunity.
pub fn hours_by_opportunity<R>(logs: impl IntoIterator<Item = R>) -> BTreeMap<Uuid, f64>
where
    R: Deref<Target = VhrLogMetadata>,
{
    let mut hours = BTreeMap::new();
    for log in logs {
        *hours.entry(log.opportunity_id).or_insert(0.0) += log.hours_to_verify;
    }
    hours
}

/// Number of visible cause and opportunity posts of an organization.
#[must_use]
pub fn active_postings(posts: &[Post], profile_id: &str) -> usize {
    posts
        .iter()
        .filter(|post| !post.is_hidden && post.profile.id == profile_id)
        .filter(|post| {
            is_cause(post)
                || is_cause_draft(post)
                || is_opportunity(post)
                || is_opportunity_draft(post)
        })
        .count()
}
