//! Emitters: trait-based format dispatch over collection partitions.

pub mod json;
pub mod lua;
pub mod markdown;
pub mod partition;
pub mod toc;

use crate::error::{Error, Result};
use crate::model::ApiCollection;

/// Render one partition of a collection into a specific output format.
pub trait Renderer {
    /// `name` is the partition name from [`partition::partition`].
    fn render(&self, name: &str, part: &ApiCollection) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "lua" => Ok(Box::new(lua::LuaRenderer)),
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(Error::UnknownFormat(format.to_string())),
    }
}
