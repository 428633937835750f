//! Relation management tools.

use serde::Deserialize;
use serde_json::Value;

use super::common::query_fields;
use crate::endpoints::Relations;
use crate::query::QueryParams;
use crate::schema::{InputSchema, Kind};
use crate::tool::{Tool, ToolDef, action_tool, data_tool};
use crate::toolset::Toolset;

const READ: &[Toolset] = &[Toolset::Default, Toolset::Schema];
const WRITE: &[Toolset] = &[Toolset::Schema];

#[derive(Clone, Debug, Deserialize)]
struct ListRelationsArgs {
    #[serde(default)]
    collection: Option<String>,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
struct RelationKey {
    collection: String,
    field: String,
}

#[derive(Clone, Debug, Deserialize)]
struct GetRelationArgs {
    #[serde(flatten)]
    key: RelationKey,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
struct CreateRelationArgs {
    data: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct UpdateRelationArgs {
    #[serde(flatten)]
    key: RelationKey,
    data: Value,
}

fn key_schema() -> InputSchema {
    InputSchema::new()
        .field("collection", Kind::String, "Collection holding the relational field")
        .field("field", Kind::String, "Relational field name")
}

pub fn tools() -> Vec<Tool> {
    vec![
        data_tool(
            ToolDef {
                name: "list_relations",
                description: "List relations, optionally only those of one collection",
                input: InputSchema::new()
                    .field(
                        "collection",
                        Kind::String.optional(),
                        "Collection name; omit to list every relation",
                    )
                    .extend(query_fields()),
                toolsets: READ,
            },
            |client, args: ListRelationsArgs| async move {
                match &args.collection {
                    Some(collection) => {
                        Relations
                            .list_for_collection(&client, collection, &args.query)
                            .await
                    }
                    None => Relations.list(&client, &args.query).await,
                }
            },
        ),
        data_tool(
            ToolDef {
                name: "get_relation",
                description: "Get the relation defined on a collection field",
                input: key_schema().extend(query_fields()),
                toolsets: READ,
            },
            |client, args: GetRelationArgs| async move {
                Relations
                    .get(&client, &args.key.collection, &args.key.field, &args.query)
                    .await
            },
        ),
        data_tool(
            ToolDef {
                name: "create_relation",
                description: "Create a relation. `data` takes `collection`, `field`, `related_collection`, and optional `meta` and `schema`",
                input: InputSchema::new().field("data", Kind::Object, "Relation definition"),
                toolsets: WRITE,
            },
            |client, args: CreateRelationArgs| async move {
                Relations.create(&client, &args.data).await
            },
        ),
        data_tool(
            ToolDef {
                name: "update_relation",
                description: "Update the meta or schema of an existing relation",
                input: key_schema().field("data", Kind::Object, "Attributes to change"),
                toolsets: WRITE,
            },
            |client, args: UpdateRelationArgs| async move {
                Relations
                    .update(&client, &args.key.collection, &args.key.field, &args.data)
                    .await
            },
        ),
        action_tool(
            ToolDef {
                name: "delete_relation",
                description: "Delete the relation defined on a collection field",
                input: key_schema(),
                toolsets: WRITE,
            },
            |client, args: RelationKey| async move {
                Relations
                    .delete(&client, &args.collection, &args.field)
                    .await
            },
            |args: &RelationKey| {
                format!(
                    "Relation on '{}.{}' deleted successfully",
                    args.collection, args.field
                )
            },
        ),
    ]
}
