//! JSON renderer: structured output for tooling integration.

use crate::error::Result;
use crate::model::ApiCollection;
use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, _name: &str, part: &ApiCollection) -> Result<String> {
        let mut out = serde_json::to_string_pretty(part)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiFunction, Version};

    #[test]
    fn renders_partition_as_collection() {
        let mut c = ApiCollection::new();
        c.add_function(ApiFunction::new("GetTime", None, Version::point(1, 0, 0)));
        let out = JsonRenderer.render("Global", &c).unwrap();
        assert!(out.ends_with("}\n"));
        assert_eq!(ApiCollection::from_json(&out).unwrap(), c);
    }
}
