//! Field management tools.

use serde::Deserialize;
use serde_json::Value;

use super::common::query_fields;
use crate::endpoints::Fields;
use crate::query::QueryParams;
use crate::schema::{InputSchema, Kind};
use crate::tool::{Tool, ToolDef, action_tool, data_tool};
use crate::toolset::Toolset;

const READ: &[Toolset] = &[Toolset::Default, Toolset::Schema];
const WRITE: &[Toolset] = &[Toolset::Schema];

#[derive(Clone, Debug, Deserialize)]
struct ListFieldsArgs {
    #[serde(default)]
    collection: Option<String>,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
struct FieldKey {
    collection: String,
    field: String,
}

#[derive(Clone, Debug, Deserialize)]
struct GetFieldArgs {
    #[serde(flatten)]
    key: FieldKey,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
struct CreateFieldArgs {
    collection: String,
    data: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct UpdateFieldArgs {
    #[serde(flatten)]
    key: FieldKey,
    data: Value,
}

fn key_schema() -> InputSchema {
    InputSchema::new()
        .field("collection", Kind::String, "Collection name")
        .field("field", Kind::String, "Field name")
}

pub fn tools() -> Vec<Tool> {
    vec![
        data_tool(
            ToolDef {
                name: "list_fields",
                description: "List fields. Pass `collection` to restrict the listing to one collection",
                input: InputSchema::new()
                    .field(
                        "collection",
                        Kind::String.optional(),
                        "Collection name; omit to list the fields of every collection",
                    )
                    .extend(query_fields()),
                toolsets: READ,
            },
            |client, args: ListFieldsArgs| async move {
                match &args.collection {
                    Some(collection) => Fields.list(&client, collection, &args.query).await,
                    None => Fields.list_all(&client, &args.query).await,
                }
            },
        ),
        data_tool(
            ToolDef {
                name: "get_field",
                description: "Get a single field definition including its meta and schema",
                input: key_schema().extend(query_fields()),
                toolsets: READ,
            },
            |client, args: GetFieldArgs| async move {
                Fields
                    .get(&client, &args.key.collection, &args.key.field, &args.query)
                    .await
            },
        ),
        data_tool(
            ToolDef {
                name: "create_field",
                description: "Add a field to a collection. `data` takes `field`, `type`, and optional `meta` and `schema`",
                input: InputSchema::new()
                    .field("collection", Kind::String, "Collection name")
                    .field("data", Kind::Object, "Field definition"),
                toolsets: WRITE,
            },
            |client, args: CreateFieldArgs| async move {
                Fields.create(&client, &args.collection, &args.data).await
            },
        ),
        data_tool(
            ToolDef {
                name: "update_field",
                description: "Update an existing field's meta or schema",
                input: key_schema().field("data", Kind::Object, "Attributes to change"),
                toolsets: WRITE,
            },
            |client, args: UpdateFieldArgs| async move {
                Fields
                    .update(&client, &args.key.collection, &args.key.field, &args.data)
                    .await
            },
        ),
        action_tool(
            ToolDef {
                name: "delete_field",
                description: "Delete a field and the data stored in it. This cannot be undone",
                input: key_schema(),
                toolsets: WRITE,
            },
            |client, args: FieldKey| async move {
                Fields.delete(&client, &args.collection, &args.field).await
            },
            |args: &FieldKey| {
                format!(
                    "Field '{}' deleted from collection '{}'",
                    args.field, args.collection
                )
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DirectusClient;
    use crate::config::DirectusConfig;
    use httpmock::Method::{DELETE, GET};
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
    async fn list_fields_scopes_by_optional_collection() {
        let server = MockServer::start_async().await;
        let all = server
            .mock_async(|when, then| {
                when.method(GET).path("/fields");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        let scoped = server
            .mock_async(|when, then| {
                when.method(GET).path("/fields/articles");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        let client = client_for(&server).await;
        let tool = find("list_fields");

        tool.call(&client, &json!({})).await.unwrap();
        tool.call(&client, &json!({ "collection": "articles" }))
            .await
            .unwrap();

        all.assert_async().await;
        scoped.assert_async().await;
    }

    #[tokio::test]
    async fn delete_field_names_field_and_collection() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/fields/articles/subtitle");
                then.status(204);
            })
            .await;
        let client = client_for(&server).await;

        let result = find("delete_field")
            .call(&client, &json!({ "collection": "articles", "field": "subtitle" }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            result.first_text(),
            Some("Field 'subtitle' deleted from collection 'articles'")
        );
    }

    #[tokio::test]
    async fn get_field_requires_both_keys() {
        let client = {
            let config = DirectusConfig::with_token("http://127.0.0.1:9", "tok").unwrap();
            DirectusClient::connect(&config).await.unwrap()
        };
        let err = find("get_field")
            .call(&client, &json!({ "collection": "articles" }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("field"));
    }
}
