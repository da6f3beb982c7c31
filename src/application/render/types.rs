use serde::Serialize;

use crate::domain::blocks::{BlockKind, ContentBlock};

use super::blocks::RenderedBlock;

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Post slug, used for log correlation only.
    pub slug: String,
    /// Fully assembled block sequence for the page.
    pub blocks: Vec<ContentBlock>,
}

impl RenderRequest {
    pub fn new(slug: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        Self {
            slug: slug.into(),
            blocks,
        }
    }
}

/// Content-level counts surfaced alongside rendered HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentMetrics {
    pub blocks_rendered: u32,
    pub blocks_dropped: u32,
    pub images_count: u32,
    pub code_blocks_count: u32,
    pub links_count: u32,
}

impl ContentMetrics {
    /// Counts for one render pass. Rendered and dropped totals come from what
    /// the dispatcher actually emitted for `input`.
    pub fn from_render(input: &[ContentBlock], rendered: &[RenderedBlock]) -> Self {
        let blocks_rendered = count(rendered.len());
        let mut metrics = ContentMetrics {
            blocks_rendered,
            blocks_dropped: count(input.len()).saturating_sub(blocks_rendered),
            ..ContentMetrics::default()
        };

        for block in input {
            match &block.kind {
                BlockKind::Image(_) => metrics.images_count += 1,
                BlockKind::Code(_) => metrics.code_blocks_count += 1,
                BlockKind::Paragraph(text)
                | BlockKind::Heading1(text)
                | BlockKind::Heading2(text)
                | BlockKind::Heading3(text)
                | BlockKind::BulletedListItem(text)
                | BlockKind::NumberedListItem(text)
                | BlockKind::Quote(text) => {
                    let links = text.rich_text.iter().filter(|span| span.href.is_some());
                    metrics.links_count += count(links.count());
                }
                BlockKind::Divider | BlockKind::Unsupported { .. } => {}
            }
        }
        metrics
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    /// Sanitised HTML fragment wrapped in the article body container.
    pub html: String,
    /// Keyed presentation nodes, in source order.
    pub blocks: Vec<RenderedBlock>,
    pub content_metrics: ContentMetrics,
}

/// Trait exposed by the rendering pipeline. Rendering never fails: blocks
/// that cannot be presented are omitted from the output.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> RenderOutput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::render_blocks;
    use crate::domain::blocks::{FileSource, ImagePayload, RichTextSpan, TextPayload};

    #[test]
    fn totals_follow_emitted_nodes() {
        let input = vec![
            ContentBlock::new(
                "p",
                BlockKind::Paragraph(TextPayload::new(vec![
                    RichTextSpan::plain("a").with_href("https://e.com"),
                    RichTextSpan::plain("b"),
                ])),
            ),
            ContentBlock::new(
                "t",
                BlockKind::Unsupported {
                    kind: "toggle".to_string(),
                },
            ),
            ContentBlock::new(
                "i",
                BlockKind::Image(ImagePayload {
                    caption: Vec::new(),
                    source: FileSource::external("https://x/y.png"),
                }),
            ),
        ];
        let rendered = render_blocks(&input);

        let metrics = ContentMetrics::from_render(&input, &rendered);

        assert_eq!(
            metrics,
            ContentMetrics {
                blocks_rendered: 2,
                blocks_dropped: 1,
                images_count: 1,
                code_blocks_count: 0,
                links_count: 1,
            }
        );
    }

    #[test]
    fn empty_render_has_zero_counts() {
        assert_eq!(
            ContentMetrics::from_render(&[], &[]),
            ContentMetrics::default()
        );
    }
}
