//! Content source seam: where posts and their blocks come from.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::blocks::ContentBlock;
use crate::domain::posts::PageObject;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content source request failed: {0}")]
    Transport(String),
    #[error("content source responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("content source response could not be decoded: {0}")]
    Decode(String),
    #[error("content source is not configured: {0}")]
    Configuration(String),
}

impl ContentError {
    pub fn from_transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Which database rows to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostQuery {
    /// Every published post, newest first.
    Published,
    /// The published post with the given slug.
    PublishedBySlug(String),
}

/// One page of a block-children listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockChildrenPage {
    #[serde(default)]
    pub results: Vec<ContentBlock>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<PageObject>, ContentError>;

    async fn list_block_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<BlockChildrenPage, ContentError>;
}

/// Follow block-children cursors until the listing is exhausted and return
/// every block in source order.
pub async fn collect_page_blocks(
    source: &dyn ContentSource,
    page_id: &str,
) -> Result<Vec<ContentBlock>, ContentError> {
    let mut blocks = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source
            .list_block_children(page_id, cursor.as_deref())
            .await?;
        pages += 1;
        blocks.extend(page.results);

        if !page.has_more {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                // Restarting without a cursor would loop over the first page forever.
                warn!(
                    target = "application::content",
                    page_id,
                    pages,
                    "listing reported more results without a cursor; stopping"
                );
                break;
            }
        }
    }

    debug!(
        target = "application::content",
        page_id,
        pages,
        blocks = blocks.len(),
        "collected page blocks"
    );
    Ok(blocks)
}
