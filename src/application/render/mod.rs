//! Block rendering pipeline.
//!
//! Rendering is pure: it accepts a fully assembled block sequence, produces
//! deterministic keyed nodes plus sanitised HTML, and never fails. Blocks the
//! renderer cannot present are omitted rather than reported.

mod blocks;
mod node;
mod rich_text;
mod service;
mod types;

pub use blocks::{RenderedBlock, render_block, render_blocks};
pub use node::{Element, Node};
pub use rich_text::{compose_span, render_rich_text};
pub use service::{BlockRenderService, render_service};
pub use types::{ContentMetrics, RenderOutput, RenderRequest, RenderService};

pub(crate) use service::{METRIC_BLOCKS_DROPPED, METRIC_BLOCKS_RENDERED};
