//! Tool descriptors and the two handler wrappers.
//!
//! [`data_tool`] returns the handler's value as pretty-printed JSON text;
//! [`action_tool`] discards it and returns a success message built from the
//! original arguments instead.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::client::DirectusClient;
use crate::error::{Error, Result};
use crate::schema::InputSchema;
use crate::toolset::Toolset;

/// One `{"type": "text"}` content block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Successful tool output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub content: Vec<Content>,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
        }
    }

    /// Two-space indented JSON of `value`.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::text(serde_json::to_string_pretty(value)?))
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            Content::Text { text } => text.as_str(),
        })
    }
}

pub type ToolFuture = BoxFuture<'static, Result<ToolResult>>;

type Handler = Arc<dyn Fn(DirectusClient, Map<String, Value>) -> ToolFuture + Send + Sync>;

/// Static part of a tool: everything except the handler.
#[derive(Clone, Debug)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub input: InputSchema,
    pub toolsets: &'static [Toolset],
}

#[derive(Clone)]
pub struct Tool {
    def: ToolDef,
    handler: Handler,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.def.name)
            .field("toolsets", &self.def.toolsets)
            .finish_non_exhaustive()
    }
}

impl Tool {
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn description(&self) -> &'static str {
        self.def.description
    }

    pub fn toolsets(&self) -> &'static [Toolset] {
        self.def.toolsets
    }

    /// Entry for `tools/list`.
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.def.name,
            "description": self.def.description,
            "inputSchema": self.def.input.to_json_schema(),
        })
    }

    /// Validate `args` and run the handler.
    pub async fn call(&self, client: &DirectusClient, args: &Value) -> Result<ToolResult> {
        let parsed = self.def.input.parse(args)?;
        (self.handler)(client.clone(), parsed).await
    }
}

fn decode_args<A: DeserializeOwned>(args: Map<String, Value>) -> Result<A> {
    serde_json::from_value(Value::Object(args)).map_err(|e| Error::validation(e.to_string()))
}

/// Wrap a handler whose resolved value is returned to the caller as JSON.
/// Handler failures propagate unchanged.
pub fn data_tool<A, T, F, Fut>(def: ToolDef, handler: F) -> Tool
where
    A: DeserializeOwned + Send + 'static,
    T: Serialize,
    F: Fn(DirectusClient, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let handler: Handler = Arc::new(
        move |client: DirectusClient, args: Map<String, Value>| -> ToolFuture {
            let args = match decode_args::<A>(args) {
                Ok(args) => args,
                Err(err) => return Box::pin(async move { Err(err) }),
            };
            let pending = handler(client, args);
            Box::pin(async move { ToolResult::json(&pending.await?) })
        },
    );
    Tool { def, handler }
}

/// Wrap a side-effect handler. Its resolved value is ignored; once it
/// succeeds, `success_message` is applied to the original arguments. On
/// failure the message is never built.
pub fn action_tool<A, T, F, Fut, M>(def: ToolDef, handler: F, success_message: M) -> Tool
where
    A: DeserializeOwned + Clone + Send + 'static,
    F: Fn(DirectusClient, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    M: Fn(&A) -> String + Send + Sync + 'static,
{
    let success_message = Arc::new(success_message);
    let handler: Handler = Arc::new(
        move |client: DirectusClient, args: Map<String, Value>| -> ToolFuture {
            let args = match decode_args::<A>(args) {
                Ok(args) => args,
                Err(err) => return Box::pin(async move { Err(err) }),
            };
            let original = args.clone();
            let pending = handler(client, args);
            let success_message = Arc::clone(&success_message);
            Box::pin(async move {
                pending.await?;
                Ok(ToolResult::text(success_message(&original)))
            })
        },
    );
    Tool { def, handler }
}
