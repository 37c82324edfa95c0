//! Maps a provider's free-text status onto [`FlightStatus`].
//!
//! The keyword table is data, not code: it carries a version and can be
//! loaded from a JSON file so provider vocabulary changes ship as config.
//! Rules are tried in order and the first keyword contained in the
//! (lower-cased) raw status wins, so order matters.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::FlightStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub status: FlightStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusKeywordTable {
    pub version: u32,
    pub rules: Vec<KeywordRule>,
}

impl Default for StatusKeywordTable {
    fn default() -> Self {
        let rules = [
            ("scheduled", FlightStatus::Scheduled),
            ("active", FlightStatus::InAir),
            ("en-route", FlightStatus::InAir),
            ("in-air", FlightStatus::InAir),
            ("landed", FlightStatus::Landed),
            ("arrived", FlightStatus::Landed),
            ("cancelled", FlightStatus::Cancelled),
            ("delayed", FlightStatus::Delayed),
            ("diverted", FlightStatus::Delayed),
        ]
        .into_iter()
        .map(|(keyword, status)| KeywordRule {
            keyword: keyword.to_string(),
            status,
        })
        .collect();

        Self { version: 1, rules }
    }
}

impl StatusKeywordTable {
    pub fn from_json(json: &str) -> Result<Self> {
        let table: StatusKeywordTable =
            serde_json::from_str(json).context("Status keyword table is not valid JSON")?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read status keyword table {}", path.display()))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            bail!("Status keyword table v{} has no rules", self.version);
        }
        if let Some(rule) = self.rules.iter().find(|r| r.keyword.trim().is_empty()) {
            bail!(
                "Status keyword table v{} has an empty keyword (status {})",
                self.version,
                rule.status
            );
        }
        Ok(())
    }
}

/// Ordered, case-insensitive substring matcher built from a keyword table.
#[derive(Debug, Clone)]
pub struct StatusMapper {
    version: u32,
    rules: Vec<(String, FlightStatus)>,
}

impl StatusMapper {
    pub fn new(table: StatusKeywordTable) -> Self {
        Self {
            version: table.version,
            rules: table
                .rules
                .into_iter()
                .map(|r| (r.keyword.to_lowercase(), r.status))
                .collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Never fails: empty, absent or unrecognised input maps to `Unknown`.
    pub fn map(&self, raw: Option<&str>) -> FlightStatus {
        let normalized = raw.unwrap_or_default().to_lowercase();
        if normalized.is_empty() {
            return FlightStatus::Unknown;
        }
        self.rules
            .iter()
            .find(|(keyword, _)| normalized.contains(keyword.as_str()))
            .map(|(_, status)| *status)
            .unwrap_or(FlightStatus::Unknown)
    }
}

impl Default for StatusMapper {
    fn default() -> Self {
        Self::new(StatusKeywordTable::default())
    }
}
