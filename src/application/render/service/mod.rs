mod config;

use std::sync::Arc;

use metrics::counter;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::application::render::blocks::{RenderedBlock, render_blocks};
use crate::application::render::types::{
    ContentMetrics, RenderOutput, RenderRequest, RenderService,
};

use self::config::build_body_sanitizer;

pub(crate) const METRIC_BLOCKS_RENDERED: &str = "blockpress_blocks_rendered_total";
pub(crate) const METRIC_BLOCKS_DROPPED: &str = "blockpress_blocks_dropped_total";

const BODY_CLASS: &str = "prose prose-gray max-w-none";

/// Default block rendering pipeline: dispatch, serialize, sanitise.
pub struct BlockRenderService {
    sanitizer: ammonia::Builder<'static>,
}

impl BlockRenderService {
    fn new() -> Self {
        Self {
            sanitizer: build_body_sanitizer(),
        }
    }

    /// Render blocks into HTML while skipping the sanitisation stage. Intended
    /// for diagnostics when refining sanitizer rules.
    pub fn render_unsanitized(&self, request: &RenderRequest) -> String {
        serialize_stage(&render_blocks(&request.blocks))
    }
}

static RENDER_SERVICE: Lazy<Arc<BlockRenderService>> =
    Lazy::new(|| Arc::new(BlockRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<BlockRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for BlockRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for BlockRenderService {
    fn render(&self, request: &RenderRequest) -> RenderOutput {
        let blocks = render_blocks(&request.blocks);
        let content_metrics = ContentMetrics::from_render(&request.blocks, &blocks);

        let html = serialize_stage(&blocks);
        let html = self.sanitizer.clean(&html).to_string();

        counter!(METRIC_BLOCKS_RENDERED).increment(content_metrics.blocks_rendered.into());
        counter!(METRIC_BLOCKS_DROPPED).increment(content_metrics.blocks_dropped.into());
        debug!(
            target = "application::render",
            slug = request.slug.as_str(),
            rendered = content_metrics.blocks_rendered,
            dropped = content_metrics.blocks_dropped,
            "rendered block sequence"
        );

        RenderOutput {
            html,
            blocks,
            content_metrics,
        }
    }
}

fn serialize_stage(blocks: &[RenderedBlock]) -> String {
    let mut html = format!("<div class=\"{BODY_CLASS}\">");
    for block in blocks {
        block.node.write_html(&mut html);
    }
    html.push_str("</div>");
    html
}
