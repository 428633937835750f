//! MCP JSON-RPC server over stdio.
//!
//! Messages arrive either `Content-Length` framed or as one JSON document per
//! line; each response is written back in the framing of its request.
//! Requests are handled one at a time in arrival order.

use std::io;

use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::client::DirectusClient;
use crate::error::{Error, Result};
use crate::tool::ToolResult;
use crate::toolset::ToolRegistry;

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const MCP_SERVER_NAME: &str = "directus-mcp";

/// How a message was delimited on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    ContentLength,
    Newline,
}

#[derive(Debug)]
pub(crate) struct RpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

impl RpcError {
    fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
            data: None,
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }

    /// Registry lookup failures are caller mistakes, reported as invalid params.
    fn from_lookup(err: Error) -> Self {
        match err {
            Error::ToolNotEnabled {
                ref required,
                ref active,
                ..
            } => {
                let data = json!({
                    "required_toolsets": required,
                    "active_toolsets": active,
                });
                Self {
                    data: Some(data),
                    ..Self::invalid_params(err.to_string())
                }
            }
            Error::ToolNotFound(_) => Self::invalid_params(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

pub struct McpServer {
    client: DirectusClient,
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(client: DirectusClient, registry: ToolRegistry) -> Self {
        Self { client, registry }
    }

    pub async fn serve_stdio(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Run until `reader` reaches end of input.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            toolsets = %self.registry.active(),
            tools = self.registry.exposed().count(),
            "MCP server ready on stdio"
        );

        while let Some((framing, body)) = read_message(&mut reader).await? {
            let response = match serde_json::from_slice::<Value>(&body) {
                Ok(incoming) => self.handle_incoming_message(incoming).await,
                Err(err) => {
                    tracing::warn!("discarding unparseable message: {err}");
                    Some(error_response(
                        Value::Null,
                        RpcError::parse_error(format!("Parse error: {err}")),
                    ))
                }
            };
            if let Some(response) = response {
                write_message(&mut writer, framing, &response).await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// A single request or a batch. Returns `None` when nothing needs a reply.
    pub async fn handle_incoming_message(&self, incoming: Value) -> Option<Value> {
        let batch = match incoming {
            Value::Array(batch) => batch,
            single => return self.handle_single_message(single).await,
        };

        if batch.is_empty() {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Batch request must not be empty"),
            ));
        }
        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = self.handle_single_message(item).await {
                responses.push(response);
            }
        }
        (!responses.is_empty()).then(|| Value::Array(responses))
    }

    async fn handle_single_message(&self, incoming: Value) -> Option<Value> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = obj.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        // Without a method this is a client response; the server never sends requests.
        let method = obj.get("method").and_then(Value::as_str)?;

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        match obj.get("id").cloned() {
            Some(id) => {
                tracing::debug!(method, "request");
                Some(match self.handle_request(method, params).await {
                    Ok(payload) => success_response(id, payload),
                    Err(err) => error_response(id, err),
                })
            }
            None => {
                tracing::debug!(method, "notification ignored");
                None
            }
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> std::result::Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false },
                "prompts": { "listChanged": false }
            },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": format!(
                "Tools for the Directus instance at {}. Active toolsets: {}.",
                self.client.base_url(),
                self.registry.active()
            )
        })
    }

    fn tools_list_payload(&self) -> Value {
        let tools: Vec<Value> = self.registry.exposed().map(|tool| tool.descriptor()).collect();
        json!({ "tools": tools })
    }

    async fn handle_tools_call(&self, params: Value) -> std::result::Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let args = match params.get("arguments") {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        let tool = self.registry.resolve(name).map_err(RpcError::from_lookup)?;
        tracing::info!(tool = name, "tool call");

        let outcome = match tool.call(&self.client, &args).await {
            Ok(result) => Ok(result),
            Err(Error::Validation(violations)) => {
                tracing::info!(tool = name, "rejected invalid arguments");
                Err(format!("Invalid parameters: {}", violations.join("; ")))
            }
            Err(err) => {
                tracing::warn!(tool = name, status = ?err.status(), "tool failed: {err}");
                Err(format!("Error executing {name}: {err}"))
            }
        };
        build_tool_call_response(outcome)
    }
}

fn build_tool_call_response(
    outcome: std::result::Result<ToolResult, String>,
) -> std::result::Result<Value, RpcError> {
    match outcome {
        Ok(result) => {
            serde_json::to_value(&result).map_err(|e| RpcError::internal(e.to_string()))
        }
        Err(text) => Ok(json!({
            "isError": true,
            "content": [{ "type": "text", "text": text }]
        })),
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    let mut payload = json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    });
    if let Some(data) = error.data {
        payload["error"]["data"] = data;
    }
    payload
}

// =============================================================================
// Framing
// =============================================================================

/// Upper bound on one message, whether a header line, a newline-delimited
/// document or a `Content-Length` body.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Read the next message body. Leading blank lines are skipped; a line that
/// starts a JSON document is a complete newline-delimited message, anything
/// else opens a header block.
///
/// Bodies are returned as raw bytes, so malformed UTF-8 surfaces as a JSON
/// parse error for that message only. Oversized messages are `InvalidData`.
pub async fn read_message<R>(reader: &mut R) -> io::Result<Option<(Framing, Vec<u8>)>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut in_headers = false;
    let mut raw = Vec::new();

    loop {
        let bytes_read = read_line_bytes(reader, &mut raw).await?;
        if bytes_read == 0 {
            if !in_headers {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Unexpected EOF while reading MCP headers",
            ));
        }

        let end = raw
            .iter()
            .rposition(|&b| !matches!(b, b'\r' | b'\n'))
            .map_or(0, |i| i + 1);
        let line = &raw[..end];
        if !in_headers {
            let candidate = line.trim_ascii_start();
            if candidate.is_empty() {
                continue;
            }
            if matches!(candidate.first().copied(), Some(b'{' | b'[')) {
                return Ok(Some((Framing::Newline, candidate.to_vec())));
            }
            in_headers = true;
        }

        if line.is_empty() {
            break;
        }
        let header = String::from_utf8_lossy(line);
        let Some((name, value)) = header.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let parsed = value.trim().parse::<usize>().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "Invalid Content-Length header")
            })?;
            if parsed > MAX_MESSAGE_BYTES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Content-Length {parsed} exceeds the {MAX_MESSAGE_BYTES} byte limit"),
                ));
            }
            content_length = Some(parsed);
        }
    }

    let content_length = content_length.ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "Missing Content-Length header")
    })?;
    let mut payload = vec![0_u8; content_length];
    reader.read_exact(&mut payload).await?;
    Ok(Some((Framing::ContentLength, payload)))
}

/// One line including its terminator, at most `MAX_MESSAGE_BYTES` long.
async fn read_line_bytes<R>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    line.clear();
    let limit = MAX_MESSAGE_BYTES as u64 + 1;
    let bytes_read = (&mut *reader).take(limit).read_until(b'\n', line).await?;
    if bytes_read as u64 == limit && line.last() != Some(&b'\n') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message line exceeds the {MAX_MESSAGE_BYTES} byte limit"),
        ));
    }
    Ok(bytes_read)
}

pub async fn write_message<W>(writer: &mut W, framing: Framing, value: &Value) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(value)?;
    match framing {
        Framing::ContentLength => {
            let header = format!(
                "Content-Length: {}\r\nContent-Type: application/json\r\n\r\n",
                body.len()
            );
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(&body).await?;
        }
        Framing::Newline => {
            writer.write_all(&body).await?;
            writer.write_all(b"\n").await?;
        }
    }
    writer.flush().await
}
