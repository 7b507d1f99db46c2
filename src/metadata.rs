//! Parsers for the descriptive lines SciVal puts above an export table.
//!
//! Both endpoints emit a few `Key,value` lines (data set, entity, year range)
//! before the CSV header. The publications export also states how many
//! publications matched and how many one page holds:
//!
//! ```text
//! Data set,"Scopus"
//! Year range,2018 to 2023
//! 3952 publications (first 1000 publications exported)
//! ```
//!
//! Fields whose line is absent are left as `None`; nothing here fails on
//! unexpected input.

use crate::error::{Result, ScivalError};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parses preamble lines into an endpoint-specific metadata record
pub trait MetadataParser {
    /// Structured metadata produced by this parser
    type Output;

    /// Extract metadata from the lines preceding the table header
    fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Self::Output;
}

/// Metadata of a publications export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationsInfo {
    /// Data set label (e.g. "Scopus")
    pub data_set: Option<String>,
    /// First year of the year range
    pub start_year: Option<i32>,
    /// Last year of the year range
    pub end_year: Option<i32>,
    /// Total number of publications in the topic
    pub total_publications: Option<u64>,
    /// Publications exported per page
    pub publications_retrieved_per_page: Option<u64>,
}

/// Metadata of a related topics export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTopicsInfo {
    /// Data set label
    pub data_set: Option<String>,
    /// Entity the related topics were computed for
    pub entity: Option<String>,
    /// Year range as free text
    pub year_range: Option<String>,
}

/// Parser for publications export preambles
#[derive(Debug, Clone)]
pub struct PublicationsInfoParser {
    year: Regex,
    count_line: Regex,
    number: Regex,
}

impl PublicationsInfoParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            year: compile(r"\d{4}")?,
            // "513 publications" or "3952 publications (first 1000 publications exported)"
            count_line: compile(r#"^"?\d+ publications\b"#)?,
            number: compile(r"\d+")?,
        })
    }
}

impl MetadataParser for PublicationsInfoParser {
    type Output = PublicationsInfo;

    fn parse<S: AsRef<str>>(&self, lines: &[S]) -> PublicationsInfo {
        let mut info = PublicationsInfo::default();

        for line in lines {
            let line: &str = line.as_ref();
            if let Some(rest) = line.strip_prefix("Data set,") {
                info.data_set = Some(rest.trim_matches('"').to_string());
            } else if line.starts_with("Year range,") {
                let years: Vec<i32> = self
                    .year
                    .find_iter(line)
                    .filter_map(|m| m.as_str().parse().ok())
                    .collect();
                if let [start, end, ..] = years[..] {
                    info.start_year = Some(start);
                    info.end_year = Some(end);
                }
            } else if self.count_line.is_match(line) {
                let mut numbers = self
                    .number
                    .find_iter(line)
                    .filter_map(|m| m.as_str().parse::<u64>().ok());
                let total = numbers.next();
                // Below 1000 results there is no "(first N ... exported)" clause
                let per_page = numbers.next().or(total);
                info.total_publications = total;
                info.publications_retrieved_per_page = per_page;
            }
        }

        info
    }
}

/// Parser for related topics export preambles
#[derive(Debug, Clone)]
pub struct RelatedTopicsInfoParser {
    data_set: Regex,
    entity: Regex,
    year_range: Regex,
}

impl RelatedTopicsInfoParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // The data set value is written with doubled quotes on this endpoint
            data_set: compile(r#"Data set,?""(.*)"""#)?,
            entity: compile(r#"Entity,?"(.*)""#)?,
            year_range: compile(r"Year range,?(.*)")?,
        })
    }
}

impl MetadataParser for RelatedTopicsInfoParser {
    type Output = RelatedTopicsInfo;

    fn parse<S: AsRef<str>>(&self, lines: &[S]) -> RelatedTopicsInfo {
        let mut info = RelatedTopicsInfo::default();

        for line in lines {
            let line: &str = line.as_ref();
            if line.starts_with("Data set,") {
                info.data_set = first_capture(&self.data_set, line);
            } else if line.starts_with("Entity,") {
                info.entity = first_capture(&self.entity, line);
            } else if line.starts_with("Year range,") {
                info.year_range = first_capture(&self.year_range, line);
            }
        }

        info
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ScivalError::Parse(e.to_string()))
}

fn first_capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publications(lines: &[&str]) -> PublicationsInfo {
        PublicationsInfoParser::new()
            .expect("patterns compile")
            .parse(lines)
    }

    fn related_topics(lines: &[&str]) -> RelatedTopicsInfo {
        RelatedTopicsInfoParser::new()
            .expect("patterns compile")
            .parse(lines)
    }

    #[test]
    fn test_small_dataset_count() {
        let info = publications(&["513 publications"]);
        assert_eq!(info.total_publications, Some(513));
        assert_eq!(info.publications_retrieved_per_page, Some(513));
    }

    #[test]
    fn test_large_dataset_count() {
        let info = publications(&["3952 publications (first 1000 publications exported)"]);
        assert_eq!(info.total_publications, Some(3952));
        assert_eq!(info.publications_retrieved_per_page, Some(1000));
    }

    #[test]
    fn test_quoted_count_line() {
        let info = publications(&["\"513 publications\""]);
        assert_eq!(info.total_publications, Some(513));
    }

    #[test]
    fn test_year_range() {
        let info = publications(&["Year range,2018-2023"]);
        assert_eq!(info.start_year, Some(2018));
        assert_eq!(info.end_year, Some(2023));

        let info = publications(&["Year range,\"2019 to 2024\""]);
        assert_eq!((info.start_year, info.end_year), (Some(2019), Some(2024)));
    }

    #[test]
    fn test_incomplete_year_range_is_absent() {
        let info = publications(&["Year range,2018"]);
        assert_eq!(info.start_year, None);
        assert_eq!(info.end_year, None);
    }

    #[test]
    fn test_publications_full_preamble() {
        let info = publications(&[
            "Data set,\"Scopus\"",
            "Entity,\"Topic T.1234\"",
            "Year range,2018 to 2023",
            "",
            "1200 publications (first 1000 publications exported)",
        ]);
        assert_eq!(
            info,
            PublicationsInfo {
                data_set: Some("Scopus".to_string()),
                start_year: Some(2018),
                end_year: Some(2023),
                total_publications: Some(1200),
                publications_retrieved_per_page: Some(1000),
            }
        );
    }

    #[test]
    fn test_publications_missing_lines() {
        let info = publications(&["Something else", "Sort by,Citations"]);
        assert_eq!(info, PublicationsInfo::default());
        // Count must open the line
        assert_eq!(publications(&["of 513 publications"]).total_publications, None);
    }

    #[test]
    fn test_related_topics_preamble() {
        let info = related_topics(&[
            "Data set,\"\"Scopus\"\"",
            "Entity,\"Topic T.1234\"",
            "Year range,2019 to 2024",
        ]);
        assert_eq!(info.data_set.as_deref(), Some("Scopus"));
        assert_eq!(info.entity.as_deref(), Some("Topic T.1234"));
        assert_eq!(info.year_range.as_deref(), Some("2019 to 2024"));
    }

    #[test]
    fn test_related_topics_single_quoted_data_set() {
        let info = related_topics(&["Data set,\"Scopus\""]);
        assert_eq!(info.data_set, None);
    }

    #[test]
    fn test_related_topics_empty() {
        let lines: Vec<String> = Vec::new();
        let info = RelatedTopicsInfoParser::new()
            .expect("patterns compile")
            .parse(&lines);
        assert_eq!(info, RelatedTopicsInfo::default());
    }
}
