//! The tool catalogue.

mod collections;
mod common;
mod fields;
mod flows;
mod insights;
mod items;
mod relations;

use crate::error::Result;
use crate::tool::Tool;
use crate::toolset::{ActiveToolsets, ToolRegistry};

/// Every tool this server knows, in listing order.
pub fn all_tools() -> Vec<Tool> {
    let mut tools = Vec::new();
    tools.extend(collections::tools());
    tools.extend(fields::tools());
    tools.extend(relations::tools());
    tools.extend(items::tools());
    tools.extend(flows::tools());
    tools.extend(insights::tools());
    tools
}

/// Registry over the full catalogue filtered by `active`.
pub fn registry(active: ActiveToolsets) -> Result<ToolRegistry> {
    ToolRegistry::with_tools(active, all_tools())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolset::Toolset;

    fn exposed_names(config: &str) -> Vec<&'static str> {
        registry(ActiveToolsets::parse(Some(config)))
            .unwrap()
            .exposed()
            .map(|t| t.name())
            .collect()
    }

    #[test]
    fn catalogue_registers_without_conflicts() {
        let registry = registry(ActiveToolsets::default()).unwrap();
        assert_eq!(registry.all().len(), 44);
    }

    #[test]
    fn default_toolset_is_read_mostly() {
        let names = exposed_names("default");
        assert!(names.contains(&"list_collections"));
        assert!(names.contains(&"create_item"));
        assert!(names.contains(&"trigger_flow"));
        assert!(!names.contains(&"create_field"));
        assert!(!names.contains(&"bulk_create_items"));
        assert!(!names.contains(&"list_dashboards"));
    }

    #[test]
    fn schema_toolset_excludes_content() {
        let names = exposed_names("schema");
        assert!(names.contains(&"create_collection"));
        assert!(names.contains(&"get_relation"));
        assert!(!names.contains(&"list_items"));
    }

    #[test]
    fn all_exposes_everything() {
        let registry = registry(ActiveToolsets::parse(Some("all"))).unwrap();
        assert_eq!(registry.exposed().count(), registry.all().len());
    }

    #[test]
    fn delete_tools_never_belong_to_default() {
        for tool in all_tools() {
            if tool.name().starts_with("delete_") || tool.name().starts_with("bulk_") {
                if tool.name() == "delete_item" {
                    continue;
                }
                assert!(
                    !tool.toolsets().contains(&Toolset::Default),
                    "{} should not be in default",
                    tool.name()
                );
            }
        }
    }

    #[test]
    fn every_descriptor_lists_required_fields() {
        for tool in all_tools() {
            let descriptor = tool.descriptor();
            assert_eq!(descriptor["inputSchema"]["type"], "object", "{}", tool.name());
            assert!(descriptor["inputSchema"]["required"].is_array(), "{}", tool.name());
        }
    }
}
