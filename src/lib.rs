//! # rustscival
//!
//! SciVal topic exports - related publications and related topics as CSV tables
//!
//! ## Modules
//!
//! - [`related_papers`] - Paginated publications export of a topic
//! - [`related_topics`] - The 50 related topics of a topic
//! - [`client`] - Authenticated CSV export client
//! - [`cache`] - On-disk cache of export pages
//! - [`split`] - Preamble/table splitting
//! - [`metadata`] - Preamble metadata parsers
//! - [`table`] - Reassembled CSV table
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustscival::RelatedPapers;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cookie = std::env::var("SCIVAL_COOKIE")?;
//!     let papers = RelatedPapers::fetch("12345", &cookie, true).await?;
//!     println!("Found {} publications", papers.data.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod metadata;
pub mod related_papers;
pub mod related_topics;
pub mod retrieval;
pub mod split;
pub mod table;

pub use cache::{CacheKey, ResponseCache};
pub use client::{ClientOptions, ScivalClient};
pub use endpoint::EndpointKind;
pub use error::{Result, ScivalError};
pub use metadata::{PublicationsInfo, RelatedTopicsInfo};
pub use related_papers::RelatedPapers;
pub use related_topics::{RelatedTopics, RELATED_TOPICS_COUNT};
pub use retrieval::RetrievalOptions;
pub use table::ExportTable;
