//! Related topics of a SciVal topic.
//!
//! SciVal always lists the 50 most related topics on a single export page.

use crate::client::ScivalClient;
use crate::endpoint::EndpointKind;
use crate::error::Result;
use crate::metadata::{MetadataParser, RelatedTopicsInfo, RelatedTopicsInfoParser};
use crate::retrieval::{assemble_table, load_page, page_rows, PageProgress, RetrievalOptions};
use crate::split::split_response;
use crate::table::ExportTable;
use std::fmt;
use tracing::info;

const ENDPOINT: EndpointKind = EndpointKind::RelatedTopics;

/// Number of rows every related topics export holds
pub const RELATED_TOPICS_COUNT: usize = 50;

/// The related topics of a topic plus the export metadata
#[derive(Debug, Clone)]
pub struct RelatedTopics {
    /// SciVal topic ID
    pub topic_id: String,
    /// Metadata parsed from the export preamble
    pub info: RelatedTopicsInfo,
    /// One row per related topic
    pub data: ExportTable,
}

impl RelatedTopics {
    /// Fetch the related topics of `topic_id` without caching
    pub async fn fetch(topic_id: &str, cookie: &str, show_progress: bool) -> Result<Self> {
        let client = ScivalClient::new(cookie)?;
        let options = RetrievalOptions {
            show_progress,
            ..Default::default()
        };
        Self::retrieve(&client, topic_id, &options).await
    }

    /// Fetch the related topics of `topic_id` with an existing client.
    ///
    /// The table must hold exactly [`RELATED_TOPICS_COUNT`] rows, whatever
    /// counts the export text mentions.
    pub async fn retrieve(
        client: &ScivalClient,
        topic_id: &str,
        options: &RetrievalOptions,
    ) -> Result<Self> {
        let progress = PageProgress::new(options.show_progress, 1);

        let text = load_page(client, options, topic_id, ENDPOINT, 1).await?;
        let split = split_response(&text, ENDPOINT);
        let info = RelatedTopicsInfoParser::new()?.parse(&split.preamble_lines);

        info!(
            topic = topic_id,
            data_set = info.data_set.as_deref().unwrap_or("N/A"),
            entity = info.entity.as_deref().unwrap_or("N/A"),
            year_range = info.year_range.as_deref().unwrap_or("N/A"),
            "Parsed related topics export metadata"
        );

        progress.println(format!(
            "Data for topic ID {}: {}",
            topic_id,
            info.data_set.as_deref().unwrap_or("N/A")
        ));
        progress.println(format!("Entity: {}", info.entity.as_deref().unwrap_or("N/A")));
        progress.println(format!(
            "Year range: {}",
            info.year_range.as_deref().unwrap_or("N/A")
        ));
        progress.page_done();
        progress.finish();

        let lines: Vec<String> = page_rows(&split.table_lines(), false, ENDPOINT.footer_lines())
            .iter()
            .map(|l| l.to_string())
            .collect();
        let data = assemble_table(ENDPOINT, &lines, RELATED_TOPICS_COUNT)?;
        info!(topic = topic_id, rows = data.len(), "Retrieved related topics");

        Ok(Self {
            topic_id: topic_id.to_string(),
            info,
            data,
        })
    }
}

impl fmt::Display for RelatedTopics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelatedTopics(topic_id={}, topics={})",
            self.topic_id,
            self.data.len()
        )
    }
}
