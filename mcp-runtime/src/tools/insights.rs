//! Insights tools: dashboards and the panels placed on them.

use super::common::{CrudNames, crud_tools};
use crate::endpoints::{dashboards, panels};
use crate::tool::Tool;
use crate::toolset::Toolset;

const DASHBOARD: &[Toolset] = &[Toolset::Dashboard];

pub fn tools() -> Vec<Tool> {
    let mut tools = crud_tools(
        CrudNames {
            noun: "Dashboard",
            read_toolsets: DASHBOARD,
            write_toolsets: DASHBOARD,
            list: ("list_dashboards", "List insights dashboards"),
            get: ("get_dashboard", "Get a single dashboard by id"),
            create: (
                "create_dashboard",
                "Create a dashboard. `data` takes `name`, and optional `icon`, `note` and `color`",
            ),
            update: ("update_dashboard", "Update a dashboard"),
            delete: (
                "delete_dashboard",
                "Delete a dashboard together with its panels",
            ),
        },
        dashboards,
    );
    tools.extend(crud_tools(
        CrudNames {
            noun: "Panel",
            read_toolsets: DASHBOARD,
            write_toolsets: DASHBOARD,
            list: ("list_panels", "List dashboard panels"),
            get: ("get_panel", "Get a single panel by id"),
            create: (
                "create_panel",
                "Create a panel. `data` takes `dashboard`, `type`, `position_x`, `position_y`, `width`, `height` and `options`",
            ),
            update: ("update_panel", "Update a panel"),
            delete: ("delete_panel", "Delete a panel"),
        },
        panels,
    ));
    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DirectusClient;
    use crate::config::DirectusConfig;
    use httpmock::Method::{PATCH, POST};
    use httpmock::MockServer;
    use serde_json::json;

    fn find(name: &str) -> Tool {
        tools().into_iter().find(|t| t.name() == name).unwrap()
    }

    #[tokio::test]
    async fn dashboards_and_panels_use_their_endpoints() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/dashboards")
                    .json_body(json!({ "name": "Sales" }));
                then.status(200).json_body(json!({ "data": { "id": "d-1" } }));
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/panels/p-1")
                    .json_body(json!({ "width": 12 }));
                then.status(200).json_body(json!({ "data": { "id": "p-1" } }));
            })
            .await;
        let config = DirectusConfig::with_token(&server.base_url(), "tok").unwrap();
        let client = DirectusClient::connect(&config).await.unwrap();

        find("create_dashboard")
            .call(&client, &json!({ "data": { "name": "Sales" } }))
            .await
            .unwrap();
        find("update_panel")
            .call(&client, &json!({ "id": "p-1", "data": { "width": 12 } }))
            .await
            .unwrap();

        create.assert_async().await;
        update.assert_async().await;
    }

    #[test]
    fn every_insights_tool_is_dashboard_only() {
        let tools = tools();
        assert_eq!(tools.len(), 10);
        assert!(tools.iter().all(|t| t.toolsets() == [Toolset::Dashboard]));
    }
}
