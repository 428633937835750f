//! Argument shapes and schema fragments shared by the tool modules.

use serde::Deserialize;
use serde_json::Value;

use crate::query::{ExportFormat, QueryParams};
use crate::resource::{Bulk, ItemId, Resource};
use crate::schema::{Field, InputSchema, Kind};
use crate::tool::{Tool, ToolDef, action_tool, data_tool};
use crate::toolset::Toolset;

// =============================================================================
// Schema fragments
// =============================================================================

pub(crate) fn id_kind() -> Kind {
    Kind::Union(vec![Kind::integer(), Kind::String])
}

fn list_kind() -> Kind {
    Kind::Union(vec![Kind::array(Kind::String), Kind::String]).optional()
}

/// Optional read parameters accepted by every list/get tool.
pub(crate) fn query_fields() -> Vec<Field> {
    vec![
        Field::new(
            "fields",
            list_kind(),
            "Fields to return, e.g. [\"id\", \"title\", \"author.*\"]",
        ),
        Field::new(
            "filter",
            Kind::Object.optional(),
            "Filter rules, e.g. {\"status\": {\"_eq\": \"published\"}}",
        ),
        Field::new("search", Kind::String.optional(), "Full-text search term"),
        Field::new(
            "sort",
            list_kind(),
            "Fields to sort by; prefix with '-' for descending order",
        ),
        Field::new(
            "limit",
            Kind::integer_min(0).optional(),
            "Maximum number of records to return",
        ),
        Field::new(
            "offset",
            Kind::integer_min(0).optional(),
            "Number of records to skip",
        ),
        Field::new("page", Kind::integer_min(1).optional(), "Page number (1-based)"),
        Field::new(
            "aggregate",
            Kind::Object.optional(),
            "Aggregate functions, e.g. {\"count\": \"*\"}",
        ),
        Field::new("groupBy", list_kind(), "Fields to group aggregates by"),
        Field::new(
            "deep",
            Kind::Object.optional(),
            "Nested query parameters for related records",
        ),
        Field::new(
            "meta",
            Kind::String.optional(),
            "Metadata to include, e.g. \"total_count\" or \"*\"",
        ),
        Field::new(
            "export",
            Kind::Enum(&ExportFormat::ALL).optional(),
            "Return the result as a file in this format",
        ),
    ]
}

// =============================================================================
// Argument shapes
// =============================================================================

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ListArgs {
    #[serde(flatten)]
    pub query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct GetArgs {
    pub id: ItemId,
    #[serde(flatten)]
    pub query: QueryParams,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CreateArgs {
    pub data: Value,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct UpdateArgs {
    pub id: ItemId,
    pub data: Value,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct DeleteArgs {
    pub id: ItemId,
}

// =============================================================================
// Plain CRUD tool family
// =============================================================================

/// Names and descriptions of the five tools generated for one resource.
pub(crate) struct CrudNames {
    pub noun: &'static str,
    pub read_toolsets: &'static [Toolset],
    pub write_toolsets: &'static [Toolset],
    pub list: (&'static str, &'static str),
    pub get: (&'static str, &'static str),
    pub create: (&'static str, &'static str),
    pub update: (&'static str, &'static str),
    pub delete: (&'static str, &'static str),
}

/// list/get/create/update/delete tools over a resource addressed by a single
/// primary key.
pub(crate) fn crud_tools(names: CrudNames, resource: fn() -> Resource<Bulk>) -> Vec<Tool> {
    let noun = names.noun;
    vec![
        data_tool(
            ToolDef {
                name: names.list.0,
                description: names.list.1,
                input: InputSchema::new().extend(query_fields()),
                toolsets: names.read_toolsets,
            },
            move |client, args: ListArgs| async move {
                resource().list(&client, &args.query).await
            },
        ),
        data_tool(
            ToolDef {
                name: names.get.0,
                description: names.get.1,
                input: InputSchema::new()
                    .field("id", id_kind(), "Primary key")
                    .extend(query_fields()),
                toolsets: names.read_toolsets,
            },
            move |client, args: GetArgs| async move {
                resource().get(&client, &args.id, &args.query).await
            },
        ),
        data_tool(
            ToolDef {
                name: names.create.0,
                description: names.create.1,
                input: InputSchema::new().field(
                    "data",
                    Kind::Object,
                    "Attributes of the new record",
                ),
                toolsets: names.write_toolsets,
            },
            move |client, args: CreateArgs| async move {
                resource().create(&client, &args.data).await
            },
        ),
        data_tool(
            ToolDef {
                name: names.update.0,
                description: names.update.1,
                input: InputSchema::new()
                    .field("id", id_kind(), "Primary key")
                    .field("data", Kind::Object, "Attributes to change"),
                toolsets: names.write_toolsets,
            },
            move |client, args: UpdateArgs| async move {
                resource().update(&client, &args.id, &args.data).await
            },
        ),
        action_tool(
            ToolDef {
                name: names.delete.0,
                description: names.delete.1,
                input: InputSchema::new().field("id", id_kind(), "Primary key"),
                toolsets: names.write_toolsets,
            },
            move |client, args: DeleteArgs| async move {
                resource().delete(&client, &args.id).await
            },
            move |args: &DeleteArgs| format!("{noun} '{}' deleted successfully", args.id),
        ),
    ]
}
