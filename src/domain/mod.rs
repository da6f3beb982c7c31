//! Domain layer: the Notion content model and post metadata.

pub mod blocks;
pub mod error;
pub mod posts;
