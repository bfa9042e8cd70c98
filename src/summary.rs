// src/summary.rs

use std::fmt;

use crate::record::{is_vacant, ChampionRecord, ORGANIZATIONS};

/// Aggregates the standings readers show: categories and vacant titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsSummary {
    pub records: usize,
    /// Distinct categories, first-seen order.
    pub categories: Vec<String>,
    /// `(organization, vacant titles)` for every organization column.
    pub vacant_by_organization: Vec<(&'static str, usize)>,
}

impl StandingsSummary {
    pub fn from_records(records: &[ChampionRecord]) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for r in records {
            if !categories.iter().any(|c| c == &r.category) {
                categories.push(r.category.clone());
            }
        }

        let vacant_by_organization = ORGANIZATIONS
            .iter()
            .map(|org| {
                let n = records
                    .iter()
                    .filter_map(|r| r.organization(org))
                    .filter(|v| is_vacant(v))
                    .count();
                (*org, n)
            })
            .collect();

        Self {
            records: records.len(),
            categories,
            vacant_by_organization,
        }
    }

    pub fn total_vacant(&self) -> usize {
        self.vacant_by_organization.iter().map(|(_, n)| n).sum()
    }

    pub fn vacant_for(&self, organization: &str) -> Option<usize> {
        self.vacant_by_organization
            .iter()
            .find(|(org, _)| *org == organization)
            .map(|(_, n)| *n)
    }
}

impl fmt::Display for StandingsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records:        {}", self.records)?;
        writeln!(f, "Categories:     {}", self.categories.len())?;
        writeln!(f, "Vacant titles:  {}", self.total_vacant())?;
        for (org, n) in &self.vacant_by_organization {
            writeln!(f, "  {:<10} {}", org, n)?;
        }
        Ok(())
    }
}

/// Rows for one weight class, in stored order.
pub fn records_in_category<'a>(
    records: &'a [ChampionRecord],
    category: &'a str,
) -> impl Iterator<Item = &'a ChampionRecord> + 'a {
    records.iter().filter(move |r| r.category == category)
}
