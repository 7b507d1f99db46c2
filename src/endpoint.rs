//! The two SciVal export surfaces a topic can be queried through.

use crate::error::ScivalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which export endpoint is being queried.
///
/// Determines the URL path, the marker line that opens the table, and how many
/// footer lines the platform appends after the last data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// Publications search export for a topic
    Publications,
    /// Related topics export for a topic
    RelatedTopics,
}

impl EndpointKind {
    /// Path of the CSV export below the SciVal base URL
    pub fn path(self) -> &'static str {
        match self {
            Self::Publications => "/search/export",
            Self::RelatedTopics => "/trends/relatedtopics/export",
        }
    }

    /// Prefix of the first line of the table (the column header)
    pub fn split_marker(self) -> &'static str {
        match self {
            Self::Publications => "\"Title",
            Self::RelatedTopics => "\"Topics\"",
        }
    }

    /// Number of summary lines after the last data row
    pub fn footer_lines(self) -> usize {
        match self {
            Self::Publications => 2,
            Self::RelatedTopics => 3,
        }
    }

    /// Subdirectory name used by the response cache
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publications => "publications",
            Self::RelatedTopics => "related_topics",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointKind {
    type Err = ScivalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" | "publications" | "papers" => Ok(Self::Publications),
            "related_topics" | "related-topics" | "topics" => Ok(Self::RelatedTopics),
            other => Err(ScivalError::InvalidEndpoint(other.to_string())),
        }
    }
}
