//! Related publications of a SciVal topic.
//!
//! The publications export is paginated. Page 1 states the total number of
//! publications and how many one page holds; the remaining pages are fetched
//! in order and their tables concatenated.

use crate::client::ScivalClient;
use crate::endpoint::EndpointKind;
use crate::error::{OptionExt, Result, ScivalError};
use crate::metadata::{MetadataParser, PublicationsInfo, PublicationsInfoParser};
use crate::retrieval::{assemble_table, load_page, page_rows, PageProgress, RetrievalOptions};
use crate::split::split_response;
use crate::table::ExportTable;
use std::fmt;
use tracing::info;

const ENDPOINT: EndpointKind = EndpointKind::Publications;

/// All publications of a topic plus the export metadata
#[derive(Debug, Clone)]
pub struct RelatedPapers {
    /// SciVal topic ID
    pub topic_id: String,
    /// Metadata parsed from page 1
    pub info: PublicationsInfo,
    /// One row per publication
    pub data: ExportTable,
    /// Number of export pages fetched
    pub pages: u32,
}

impl RelatedPapers {
    /// Fetch every related publication of `topic_id` without caching.
    ///
    /// # Arguments
    ///
    /// * `topic_id` - SciVal topic ID
    /// * `cookie` - Cookie header of an authenticated SciVal session
    /// * `show_progress` - Show a progress bar while fetching pages
    pub async fn fetch(topic_id: &str, cookie: &str, show_progress: bool) -> Result<Self> {
        let client = ScivalClient::new(cookie)?;
        let options = RetrievalOptions {
            show_progress,
            ..Default::default()
        };
        Self::retrieve(&client, topic_id, &options).await
    }

    /// Fetch every related publication of `topic_id` with an existing client.
    ///
    /// # Errors
    ///
    /// Fails on the first page that cannot be fetched, when page 1 does not
    /// state the publication counts, and with
    /// [`ScivalError::RowCountMismatch`] when the assembled table does not
    /// hold exactly the announced number of publications.
    pub async fn retrieve(
        client: &ScivalClient,
        topic_id: &str,
        options: &RetrievalOptions,
    ) -> Result<Self> {
        let progress = PageProgress::new(options.show_progress, 1);

        let text = load_page(client, options, topic_id, ENDPOINT, 1).await?;
        let first = split_response(&text, ENDPOINT);
        let info = PublicationsInfoParser::new()?.parse(&first.preamble_lines);

        let total = info
            .total_publications
            .ok_or_missing(ENDPOINT, "total_publications")?;
        let per_page = info
            .publications_retrieved_per_page
            .filter(|n| *n > 0)
            .ok_or_missing(ENDPOINT, "publications_retrieved_per_page")?;
        let expected = usize::try_from(total)
            .map_err(|_| ScivalError::Parse(format!("Publication count too large: {}", total)))?;
        let num_pages = u32::try_from(total.div_ceil(per_page))
            .map_err(|_| ScivalError::Parse(format!("Page count too large for {} publications", total)))?;

        info!(
            topic = topic_id,
            data_set = info.data_set.as_deref().unwrap_or("N/A"),
            total = total,
            per_page = per_page,
            pages = num_pages,
            "Parsed publications export metadata"
        );

        progress.println(format!(
            "Data for topic ID {}: {}",
            topic_id,
            info.data_set.as_deref().unwrap_or("N/A")
        ));
        progress.println(format!(
            "Year range: {} - {}",
            display_or_na(info.start_year),
            display_or_na(info.end_year)
        ));
        progress.println(format!("Total publications: {}", total));
        progress.println(format!("Retrieved per page: {}", per_page));
        progress.println(format!("Total pages: {}", num_pages));
        progress.set_length(u64::from(num_pages.max(1)));
        progress.page_done();

        let footer = ENDPOINT.footer_lines();
        let mut lines: Vec<String> = page_rows(&first.table_lines(), false, footer)
            .iter()
            .map(|l| l.to_string())
            .collect();

        for page in 2..=num_pages {
            let text = load_page(client, options, topic_id, ENDPOINT, page).await?;
            let split = split_response(&text, ENDPOINT);
            lines.extend(
                page_rows(&split.table_lines(), true, footer)
                    .iter()
                    .map(|l| l.to_string()),
            );
            progress.page_done();
        }
        progress.finish();

        let data = assemble_table(ENDPOINT, &lines, expected)?;
        info!(topic = topic_id, rows = data.len(), pages = num_pages, "Retrieved related publications");

        Ok(Self {
            topic_id: topic_id.to_string(),
            info,
            data,
            pages: num_pages,
        })
    }
}

impl fmt::Display for RelatedPapers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelatedPapers(topic_id={}, papers={})",
            self.topic_id,
            self.data.len()
        )
    }
}

fn display_or_na<T: fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
