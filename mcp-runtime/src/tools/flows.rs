//! Automation tools: flows, their operations, and webhook triggering.

use serde::Deserialize;
use serde_json::Value;

use super::common::{CrudNames, crud_tools, id_kind};
use crate::endpoints::{TriggerMethod, Triggerable, flows, operations};
use crate::resource::ItemId;
use crate::schema::{InputSchema, Kind};
use crate::tool::{Tool, ToolDef, data_tool};
use crate::toolset::Toolset;

const READ: &[Toolset] = &[Toolset::Default, Toolset::Flow];
const WRITE: &[Toolset] = &[Toolset::Flow];

#[derive(Clone, Debug, Deserialize)]
struct TriggerFlowArgs {
    id: ItemId,
    #[serde(default)]
    method: TriggerMethod,
    #[serde(default)]
    data: Option<Value>,
}

fn trigger_flow() -> Tool {
    data_tool(
        ToolDef {
            name: "trigger_flow",
            description: "Run a flow that uses a webhook trigger. `data` is sent as the payload of POST triggers",
            input: InputSchema::new()
                .field("id", id_kind(), "Flow id")
                .field(
                    "method",
                    Kind::Enum(&TriggerMethod::ALL).optional(),
                    "HTTP method configured on the trigger, POST by default",
                )
                .field(
                    "data",
                    Kind::Object.optional(),
                    "Payload passed to the flow",
                ),
            toolsets: READ,
        },
        |client, args: TriggerFlowArgs| async move {
            flows()
                .trigger(&client, &args.id, args.method, args.data.as_ref())
                .await
        },
    )
}

pub fn tools() -> Vec<Tool> {
    let mut tools = crud_tools(
        CrudNames {
            noun: "Flow",
            read_toolsets: READ,
            write_toolsets: WRITE,
            list: ("list_flows", "List flows with their triggers and status"),
            get: ("get_flow", "Get a single flow by id"),
            create: (
                "create_flow",
                "Create a flow. `data` takes `name`, `trigger`, `status` and trigger `options`",
            ),
            update: ("update_flow", "Update a flow"),
            delete: (
                "delete_flow",
                "Delete a flow together with its operations",
            ),
        },
        || (*flows()).clone(),
    );
    tools.push(trigger_flow());
    tools.extend(crud_tools(
        CrudNames {
            noun: "Operation",
            read_toolsets: WRITE,
            write_toolsets: WRITE,
            list: ("list_operations", "List flow operations"),
            get: ("get_operation", "Get a single flow operation by id"),
            create: (
                "create_operation",
                "Create an operation. `data` takes `flow`, `type`, `key`, `position_x`, `position_y` and `options`",
            ),
            update: ("update_operation", "Update a flow operation"),
            delete: ("delete_operation", "Delete a flow operation"),
        },
        operations,
    ));
    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DirectusClient;
    use crate::config::DirectusConfig;
    use httpmock::Method::{DELETE, GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    fn find(name: &str) -> Tool {
        tools().into_iter().find(|t| t.name() == name).unwrap()
    }

    async fn client_for(server: &MockServer) -> DirectusClient {
        let config = DirectusConfig::with_token(&server.base_url(), "tok").unwrap();
        DirectusClient::connect(&config).await.unwrap()
    }

    #[tokio::test]
    async fn trigger_defaults_to_post_with_payload() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/flows/trigger/6c1f")
                    .json_body(json!({ "article": 3 }));
                then.status(200).json_body(json!({ "queued": true }));
            })
            .await;
        let client = client_for(&server).await;

        let result = find("trigger_flow")
            .call(&client, &json!({ "id": "6c1f", "data": { "article": 3 } }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(result.first_text().unwrap().contains("\"queued\": true"));
    }

    #[tokio::test]
    async fn trigger_accepts_get() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/flows/trigger/6c1f");
                then.status(200).json_body(json!({}));
            })
            .await;
        let client = client_for(&server).await;

        find("trigger_flow")
            .call(&client, &json!({ "id": "6c1f", "method": "GET" }))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn trigger_rejects_unknown_method() {
        let config = DirectusConfig::with_token("http://127.0.0.1:9", "tok").unwrap();
        let client = DirectusClient::connect(&config).await.unwrap();

        let err = find("trigger_flow")
            .call(&client, &json!({ "id": "6c1f", "method": "PUT" }))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("method"));
    }

    #[tokio::test]
    async fn operations_live_under_their_own_root() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/operations");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/operations/op-1");
                then.status(204);
            })
            .await;
        let client = client_for(&server).await;

        find("list_operations").call(&client, &json!({})).await.unwrap();
        let result = find("delete_operation")
            .call(&client, &json!({ "id": "op-1" }))
            .await
            .unwrap();

        list.assert_async().await;
        delete.assert_async().await;
        assert_eq!(
            result.first_text(),
            Some("Operation 'op-1' deleted successfully")
        );
    }

    #[test]
    fn flow_reads_are_in_the_default_toolset() {
        for name in ["list_flows", "get_flow", "trigger_flow"] {
            assert!(find(name).toolsets().contains(&Toolset::Default), "{name}");
        }
        for name in ["create_flow", "delete_flow", "list_operations"] {
            assert_eq!(find(name).toolsets(), &[Toolset::Flow], "{name}");
        }
    }
}
