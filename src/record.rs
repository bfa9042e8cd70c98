// src/record.rs

use serde::{Deserialize, Serialize};

/// Organization columns, in source order.
pub const ORGANIZATIONS: [&str; 5] = ["WBA", "WBC", "IBF", "WBO", "The_Ring"];

/// One row of standings: who holds each belt in one weight class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionRecord {
    #[serde(rename = "WBA")]
    pub wba: String,
    #[serde(rename = "WBC")]
    pub wbc: String,
    #[serde(rename = "IBF")]
    pub ibf: String,
    #[serde(rename = "WBO")]
    pub wbo: String,
    #[serde(rename = "The_Ring")]
    pub the_ring: String,
    #[serde(rename = "Category")]
    pub category: String,
}

impl ChampionRecord {
    /// Build from five organization cells plus the category label.
    pub fn from_cells(cells: [String; 5], category: &str) -> Self {
        let [wba, wbc, ibf, wbo, the_ring] = cells;
        Self {
            wba,
            wbc,
            ibf,
            wbo,
            the_ring,
            category: category.to_string(),
        }
    }

    /// Value for an organization column name, e.g. `"WBC"`.
    pub fn organization(&self, name: &str) -> Option<&str> {
        match name {
            "WBA" => Some(self.wba.as_str()),
            "WBC" => Some(self.wbc.as_str()),
            "IBF" => Some(self.ibf.as_str()),
            "WBO" => Some(self.wbo.as_str()),
            "The_Ring" => Some(self.the_ring.as_str()),
            _ => None,
        }
    }
}

/// `true` when the cell holds the vacancy sentinel (any case, any position).
pub fn is_vacant(value: &str) -> bool {
    value.to_lowercase().contains("vacant")
}
