//! Application services: rendering, content fetching, post assembly.

pub mod content;
pub mod error;
pub mod posts;
pub mod render;
