//! The hall of researchers: bug reporters and fixers in one listing.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::errors::{AppError, AppResult};
use crate::models::{Bug, FixWithBug, SuccessfulFixed};
use crate::store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Reporter,
    Fixer,
}

impl Role {
    pub const LABELS: [&'static str; 2] = ["Reporter", "Fixer"];

    pub fn label(&self) -> &'static str {
        match self {
            Role::Reporter => "Reporter",
            Role::Fixer => "Fixer",
        }
    }

    /// Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "reporter" => Some(Role::Reporter),
            "fixer" => Some(Role::Fixer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearcherEntry {
    pub sno: usize,
    pub splf_id: String,
    pub bug_type: String,
    pub category: Role,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub bug_id: i64,
    pub fix_id: Option<i64>,
    pub bug_title: String,
}

impl ResearcherEntry {
    fn from_bug(bug: &Bug) -> Self {
        Self {
            sno: 0,
            splf_id: String::new(),
            bug_type: bug.category.as_str().to_string(),
            category: Role::Reporter,
            full_name: bug.full_name.clone(),
            email: bug.email.clone(),
            phone: bug.phone.clone(),
            bug_id: bug.id,
            fix_id: None,
            bug_title: bug.title.clone(),
        }
    }

    fn from_fix(row: &FixWithBug) -> Self {
        Self {
            sno: 0,
            splf_id: row.fix.splf_number.clone().unwrap_or_default(),
            bug_type: row.fix.category.as_str().to_string(),
            category: Role::Fixer,
            full_name: row.fix.full_name.clone(),
            email: row.fix.email.clone(),
            phone: row.fix.phone.clone(),
            bug_id: row.fix.bug_id,
            fix_id: Some(row.fix.id),
            bug_title: row.bug_title.clone(),
        }
    }

    /// Every searchable field, lowercased and joined without separators.
    /// A query may therefore match across the boundary of two fields.
    fn haystack(&self) -> String {
        [
            self.full_name.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
            self.phone.as_str(),
            self.splf_id.as_str(),
            self.bug_type.as_str(),
            self.category.label(),
            self.bug_title.as_str(),
        ]
        .concat()
        .to_lowercase()
    }
}

/// Reporters first (one per bug), then fixers (one per fix), in the given order.
pub fn entries(bugs: &[Bug], fixes: &[FixWithBug]) -> Vec<ResearcherEntry> {
    bugs.iter()
        .map(ResearcherEntry::from_bug)
        .chain(fixes.iter().map(ResearcherEntry::from_fix))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResearcherQuery {
    pub category: Option<String>,
    pub bug_type: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResearcherListing {
    pub researchers: Vec<ResearcherEntry>,
    pub filter_category: String,
    pub filter_bug_type: String,
    pub search_query: String,
    pub bug_types: Vec<String>,
    pub categories: [&'static str; 2],
}

pub fn filter(mut entries: Vec<ResearcherEntry>, query: &ResearcherQuery) -> ResearcherListing {
    let category = query.category.clone().unwrap_or_default();
    let bug_type = query.bug_type.clone().unwrap_or_default();
    let search = query
        .search
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if !category.is_empty() {
        let wanted = category.to_lowercase();
        entries.retain(|e| e.category.label().to_lowercase() == wanted);
    }
    if !bug_type.is_empty() {
        let wanted = bug_type.to_lowercase();
        entries.retain(|e| e.bug_type.to_lowercase() == wanted);
    }
    if !search.is_empty() {
        entries.retain(|e| e.haystack().contains(&search));
    }
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.sno = idx + 1;
    }

    let mut bug_types: Vec<String> = entries
        .iter()
        .filter(|e| !e.bug_type.is_empty())
        .map(|e| e.bug_type.clone())
        .collect();
    bug_types.sort();
    bug_types.dedup();

    ResearcherListing {
        researchers: entries,
        filter_category: category,
        filter_bug_type: bug_type,
        search_query: search,
        bug_types,
        categories: Role::LABELS,
    }
}

pub async fn listing(pool: &SqlitePool, query: &ResearcherQuery) -> Result<ResearcherListing, sqlx::Error> {
    let bugs = store::list_bugs_by_id(pool).await?;
    let fixes = store::list_fixes(pool).await?;
    Ok(filter(entries(&bugs, &fixes), query))
}

#[derive(Debug, Serialize)]
pub struct ResearcherDetail {
    pub splf_id: String,
    pub bug_type: String,
    pub category: Role,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub bug: Bug,
    pub fix: Option<SuccessfulFixed>,
}

pub async fn detail(pool: &SqlitePool, role: &str, id: i64) -> AppResult<ResearcherDetail> {
    match Role::parse(role) {
        Some(Role::Reporter) => {
            let bug = store::get_bug(pool, id)
                .await?
                .ok_or_else(|| AppError::not_found("Bug not found"))?;
            Ok(ResearcherDetail {
                splf_id: String::new(),
                bug_type: bug.category.as_str().to_string(),
                category: Role::Reporter,
                full_name: bug.full_name.clone(),
                email: bug.email.clone(),
                phone: bug.phone.clone(),
                bug,
                fix: None,
            })
        }
        Some(Role::Fixer) => {
            let row = store::get_fix(pool, id)
                .await?
                .ok_or_else(|| AppError::not_found("Fix not found"))?;
            let bug = store::get_bug(pool, row.fix.bug_id)
                .await?
                .ok_or_else(|| AppError::not_found("Bug not found"))?;
            let fix = row.fix;
            Ok(ResearcherDetail {
                splf_id: fix.splf_number.clone().unwrap_or_default(),
                bug_type: fix.category.as_str().to_string(),
                category: Role::Fixer,
                full_name: fix.full_name.clone(),
                email: fix.email.clone(),
                phone: fix.phone.clone(),
                bug,
                fix: Some(fix),
            })
        }
        None => Err(AppError::InvalidCategory),
    }
}
