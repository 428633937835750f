//! Collection management tools.

use serde::Deserialize;
use serde_json::Value;

use super::common::{ListArgs, query_fields};
use crate::endpoints::collections;
use crate::query::QueryParams;
use crate::schema::{InputSchema, Kind};
use crate::tool::{Tool, ToolDef, action_tool, data_tool};
use crate::toolset::Toolset;

const READ: &[Toolset] = &[Toolset::Default, Toolset::Schema];
const WRITE: &[Toolset] = &[Toolset::Schema];

#[derive(Clone, Debug, Deserialize)]
struct GetCollectionArgs {
    collection: String,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
struct CreateCollectionArgs {
    data: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct UpdateCollectionArgs {
    collection: String,
    data: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct DeleteCollectionArgs {
    collection: String,
}

pub fn tools() -> Vec<Tool> {
    vec![
        data_tool(
            ToolDef {
                name: "list_collections",
                description: "List all collections in the Directus instance, including system collections",
                input: InputSchema::new().extend(query_fields()),
                toolsets: READ,
            },
            |client, args: ListArgs| async move { collections().list(&client, &args.query).await },
        ),
        data_tool(
            ToolDef {
                name: "get_collection",
                description: "Get a single collection with its meta and schema information",
                input: InputSchema::new()
                    .field("collection", Kind::String, "Collection name")
                    .extend(query_fields()),
                toolsets: READ,
            },
            |client, args: GetCollectionArgs| async move {
                collections()
                    .get(&client, &args.collection, &args.query)
                    .await
            },
        ),
        data_tool(
            ToolDef {
                name: "create_collection",
                description: "Create a collection. `data` takes `collection`, optional `meta`, `schema` and initial `fields`",
                input: InputSchema::new().field(
                    "data",
                    Kind::Object,
                    "Collection definition",
                ),
                toolsets: WRITE,
            },
            |client, args: CreateCollectionArgs| async move {
                collections().create(&client, &args.data).await
            },
        ),
        data_tool(
            ToolDef {
                name: "update_collection",
                description: "Update the meta information of a collection",
                input: InputSchema::new()
                    .field("collection", Kind::String, "Collection name")
                    .field("data", Kind::Object, "Attributes to change, usually `meta`"),
                toolsets: WRITE,
            },
            |client, args: UpdateCollectionArgs| async move {
                collections()
                    .update(&client, &args.collection, &args.data)
                    .await
            },
        ),
        action_tool(
            ToolDef {
                name: "delete_collection",
                description: "Delete a collection together with all of its items. This cannot be undone",
                input: InputSchema::new().field("collection", Kind::String, "Collection name"),
                toolsets: WRITE,
            },
            |client, args: DeleteCollectionArgs| async move {
                collections().delete(&client, &args.collection).await
            },
            |args: &DeleteCollectionArgs| {
                format!("Collection '{}' deleted successfully", args.collection)
            },
        ),
    ]
}
