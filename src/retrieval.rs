//! Pieces shared by the paginated retrievers: options, cached page loading,
//! footer trimming, row-count validation and page progress.

use crate::cache::{CacheKey, ResponseCache};
use crate::client::ScivalClient;
use crate::endpoint::EndpointKind;
use crate::error::{Result, ScivalError};
use crate::table::ExportTable;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// How a retrieval runs
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Show a per-page progress bar and a dataset summary
    pub show_progress: bool,
    /// Response cache; `None` always goes to the network
    pub cache: Option<ResponseCache>,
    /// Skip cache reads (fresh pages are still written to the cache)
    pub force_refresh: bool,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
            cache: None,
            force_refresh: false,
        }
    }
}

/// Fetch one page, going through the cache when one is configured
pub(crate) async fn load_page(
    client: &ScivalClient,
    options: &RetrievalOptions,
    topic_id: &str,
    kind: EndpointKind,
    page: u32,
) -> Result<String> {
    match &options.cache {
        Some(cache) => {
            let key = CacheKey::new(kind, topic_id, page);
            cache
                .fetch_with_cache(client, &key, options.force_refresh)
                .await
        }
        None => client.fetch(topic_id, kind, page).await,
    }
}

/// Data lines of one page's table.
///
/// Drops the repeated column header when `skip_header` is set and the
/// trailing `footer` summary lines. Short pages yield nothing.
pub(crate) fn page_rows<'a>(lines: &'a [&'a str], skip_header: bool, footer: usize) -> &'a [&'a str] {
    let start = usize::from(skip_header).min(lines.len());
    let end = lines.len().saturating_sub(footer).max(start);
    &lines[start..end]
}

/// Parse the accumulated lines and check the row count
pub(crate) fn assemble_table(
    kind: EndpointKind,
    lines: &[String],
    expected: usize,
) -> Result<ExportTable> {
    let table = ExportTable::from_csv_text(&lines.join("\n"))?;
    debug!(endpoint = %kind, lines = lines.len(), rows = table.len(), "Assembled table");

    if table.len() != expected {
        return Err(ScivalError::RowCountMismatch {
            endpoint: kind,
            expected,
            actual: table.len(),
        });
    }

    Ok(table)
}

/// Page progress bar, hidden unless progress was requested
pub(crate) struct PageProgress {
    bar: ProgressBar,
}

impl PageProgress {
    pub(crate) fn new(show: bool, pages: u64) -> Self {
        if !show {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(pages);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pages")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message("Fetching pages");
        Self { bar }
    }

    /// Print a line above the bar
    pub(crate) fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }

    pub(crate) fn set_length(&self, pages: u64) {
        self.bar.set_length(pages);
    }

    pub(crate) fn page_done(&self) {
        self.bar.inc(1);
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
