//! Item tools: CRUD over any user collection plus batch variants.

use serde::Deserialize;
use serde_json::Value;

use super::common::{id_kind, query_fields};
use crate::endpoints::items;
use crate::query::QueryParams;
use crate::resource::ItemId;
use crate::schema::{InputSchema, Kind};
use crate::tool::{Tool, ToolDef, action_tool, data_tool};
use crate::toolset::Toolset;

const CRUD: &[Toolset] = &[Toolset::Default, Toolset::Content];
const BULK: &[Toolset] = &[Toolset::Content];

#[derive(Clone, Debug, Deserialize)]
struct ListItemsArgs {
    collection: String,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
struct GetItemArgs {
    collection: String,
    id: ItemId,
    #[serde(flatten)]
    query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
struct CreateItemArgs {
    collection: String,
    data: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct UpdateItemArgs {
    collection: String,
    id: ItemId,
    data: Value,
}

#[derive(Clone, Debug, Deserialize)]
struct DeleteItemArgs {
    collection: String,
    id: ItemId,
}

#[derive(Clone, Debug, Deserialize)]
struct BulkItemsArgs {
    collection: String,
    items: Vec<Value>,
}

#[derive(Clone, Debug, Deserialize)]
struct BulkDeleteArgs {
    collection: String,
    ids: Vec<ItemId>,
}

fn collection_schema() -> InputSchema {
    InputSchema::new().field("collection", Kind::String, "Collection name")
}

pub fn tools() -> Vec<Tool> {
    vec![
        data_tool(
            ToolDef {
                name: "list_items",
                description: "List items of a collection. Supports filtering, search, sorting, pagination and aggregation",
                input: collection_schema().extend(query_fields()),
                toolsets: CRUD,
            },
            |client, args: ListItemsArgs| async move {
                items(&args.collection)?.list(&client, &args.query).await
            },
        ),
        data_tool(
            ToolDef {
                name: "get_item",
                description: "Get a single item by primary key",
                input: collection_schema()
                    .field("id", id_kind(), "Primary key of the item")
                    .extend(query_fields()),
                toolsets: CRUD,
            },
            |client, args: GetItemArgs| async move {
                items(&args.collection)?
                    .get(&client, &args.id, &args.query)
                    .await
            },
        ),
        data_tool(
            ToolDef {
                name: "create_item",
                description: "Create a single item in a collection",
                input: collection_schema().field("data", Kind::Object, "Field values of the new item"),
                toolsets: CRUD,
            },
            |client, args: CreateItemArgs| async move {
                items(&args.collection)?.create(&client, &args.data).await
            },
        ),
        data_tool(
            ToolDef {
                name: "update_item",
                description: "Update a single item. Only the fields present in `data` change",
                input: collection_schema()
                    .field("id", id_kind(), "Primary key of the item")
                    .field("data", Kind::Object, "Field values to change"),
                toolsets: CRUD,
            },
            |client, args: UpdateItemArgs| async move {
                items(&args.collection)?
                    .update(&client, &args.id, &args.data)
                    .await
            },
        ),
        action_tool(
            ToolDef {
                name: "delete_item",
                description: "Delete a single item by primary key",
                input: collection_schema().field("id", id_kind(), "Primary key of the item"),
                toolsets: CRUD,
            },
            |client, args: DeleteItemArgs| async move {
                items(&args.collection)?.delete(&client, &args.id).await
            },
            |args: &DeleteItemArgs| {
                format!(
                    "Item '{}' deleted from collection '{}'",
                    args.id, args.collection
                )
            },
        ),
        data_tool(
            ToolDef {
                name: "bulk_create_items",
                description: "Create several items in one request",
                input: collection_schema().field(
                    "items",
                    Kind::array(Kind::Object),
                    "Field values of each new item",
                ),
                toolsets: BULK,
            },
            |client, args: BulkItemsArgs| async move {
                items(&args.collection)?
                    .bulk_create(&client, &args.items)
                    .await
            },
        ),
        data_tool(
            ToolDef {
                name: "bulk_update_items",
                description: "Update several items in one request. Each entry must contain its primary key",
                input: collection_schema().field(
                    "items",
                    Kind::array(Kind::Object),
                    "Partial items, each including its primary key",
                ),
                toolsets: BULK,
            },
            |client, args: BulkItemsArgs| async move {
                items(&args.collection)?
                    .bulk_update(&client, &args.items)
                    .await
            },
        ),
        action_tool(
            ToolDef {
                name: "bulk_delete_items",
                description: "Delete several items by primary key in one request",
                input: collection_schema().field(
                    "ids",
                    Kind::array(id_kind()),
                    "Primary keys of the items to delete",
                ),
                toolsets: BULK,
            },
            |client, args: BulkDeleteArgs| async move {
                items(&args.collection)?
                    .bulk_delete(&client, &args.ids)
                    .await
            },
            |args: &BulkDeleteArgs| {
                format!(
                    "Deleted {} items from collection '{}'",
                    args.ids.len(),
                    args.collection
                )
            },
        ),
    ]
}
