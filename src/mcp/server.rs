//! In-process MCP server exposing the Devin session tools.
//!
//! One instance is constructed per bridged HTTP request and dropped when
//! the response has been written; there is no state shared between
//! requests. Upstream failures become tool-level error results so the
//! outer JSON-RPC envelope stays successful.

use crate::api::{CreateSessionOptions, DevinClient, DevinSession};
use crate::mcp::{
    MCP_SERVER_NAME, MCP_SERVER_VERSION, TOOL_CREATE_SESSION, TOOL_GET_STATUS, TOOL_SEND_MESSAGE,
};
use rust_mcp_schema::{CallToolRequestParams, RpcError, LATEST_PROTOCOL_VERSION};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct CreateSessionArgs {
    prompt: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageArgs {
    session_id: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetStatusArgs {
    session_id: String,
}

pub struct DevinMcpServer {
    client: DevinClient,
}

impl DevinMcpServer {
    pub fn new(client: DevinClient) -> Self {
        Self { client }
    }

    /// Dispatches one JSON-RPC request method and returns its result
    /// payload, or an [`RpcError`] for protocol-level failures.
    pub async fn handle_request(
        &self,
        method: &str,
        params: Option<&Value>,
    ) -> Result<Value, RpcError> {
        debug!(method = %method, "Handling MCP request");
        match method {
            "initialize" => Ok(self.initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::method_not_found()
                .with_message(&format!("Method not supported: {other}"))),
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": LATEST_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": MCP_SERVER_VERSION,
            },
        })
    }

    async fn call_tool(&self, params: Option<&Value>) -> Result<Value, RpcError> {
        let params = params
            .cloned()
            .ok_or_else(|| RpcError::invalid_params().with_message("Missing tool call params."))?;
        let params: CallToolRequestParams = serde_json::from_value(params)
            .map_err(|err| RpcError::invalid_params().with_message(&err.to_string()))?;
        let arguments = Value::Object(params.arguments.clone().unwrap_or_default());

        match params.name.as_str() {
            TOOL_CREATE_SESSION => Ok(self.create_session(arguments).await),
            TOOL_SEND_MESSAGE => Ok(self.send_message(arguments).await),
            TOOL_GET_STATUS => Ok(self.get_status(arguments).await),
            other => {
                Err(RpcError::invalid_params().with_message(&format!("Unknown tool: {other}")))
            }
        }
    }

    async fn create_session(&self, arguments: Value) -> Value {
        let args: CreateSessionArgs = match parse_arguments(arguments) {
            Ok(args) => args,
            Err(err) => return tool_error(format!("Failed to create Devin session: {err}")),
        };

        let options = CreateSessionOptions {
            title: args.title,
            tags: args.tags,
        };
        match self.client.create_session(&args.prompt, options).await {
            Ok(session) => tool_text(create_session_text(&session)),
            Err(err) => {
                error!(error = %err, "Error creating Devin session");
                tool_error(format!("Failed to create Devin session: {err}"))
            }
        }
    }

    async fn send_message(&self, arguments: Value) -> Value {
        let args: SendMessageArgs = match parse_arguments(arguments) {
            Ok(args) => args,
            Err(err) => {
                return tool_error(format!("Failed to send message to Devin session: {err}"))
            }
        };

        match self.client.send_message(&args.session_id, &args.message).await {
            Ok(session) => tool_text(send_message_text(&session)),
            Err(err) => {
                error!(error = %err, "Error sending message to Devin session");
                tool_error(format!("Failed to send message to Devin session: {err}"))
            }
        }
    }

    async fn get_status(&self, arguments: Value) -> Value {
        let args: GetStatusArgs = match parse_arguments(arguments) {
            Ok(args) => args,
            Err(err) => return tool_error(format!("Failed to get Devin session status: {err}")),
        };

        match self.client.session_status(&args.session_id).await {
            Ok(session) => tool_text(get_status_text(&session)),
            Err(err) => {
                error!(error = %err, "Error getting Devin session status");
                tool_error(format!("Failed to get Devin session status: {err}"))
            }
        }
    }
}

fn parse_arguments<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, String> {
    serde_json::from_value(arguments).map_err(|err| err.to_string())
}

fn tool_text(text: String) -> Value {
    json!({ "content": [{ "type": "text", "text": text }] })
}

fn tool_error(text: String) -> Value {
    json!({ "content": [{ "type": "text", "text": text }], "isError": true })
}

fn create_session_text(session: &DevinSession) -> String {
    let mut lines = vec![
        "Devin session created successfully!".to_string(),
        String::new(),
        format!("Session ID: {}", session.session_id),
        format!("Status: {}", session.status),
    ];
    if let Some(title) = &session.title {
        lines.push(format!("Title: {title}"));
    }
    if let Some(url) = &session.url {
        lines.push(format!("Session URL: {url}"));
    }
    lines.push(String::new());
    lines.push(
        "You can monitor the session progress using the devin_get_status tool or send follow-up \
         messages using devin_send_message."
            .to_string(),
    );
    lines.join("\n")
}

fn send_message_text(session: &DevinSession) -> String {
    let mut lines = vec![
        "Message sent to Devin session successfully!".to_string(),
        String::new(),
        format!("Session ID: {}", session.session_id),
        format!("Status: {}", session.status),
    ];
    if let Some(url) = &session.url {
        lines.push(format!("Session URL: {url}"));
    }
    lines.join("\n")
}

fn get_status_text(session: &DevinSession) -> String {
    let mut lines = vec![
        "Devin Session Status".to_string(),
        String::new(),
        format!("Session ID: {}", session.session_id),
        format!("Status: {}", session.status),
    ];
    if let Some(title) = &session.title {
        lines.push(format!("Title: {title}"));
    }
    if let Some(url) = &session.url {
        lines.push(format!("Session URL: {url}"));
    }
    if let Some(output) = &session.structured_output {
        let pretty = serde_json::to_string_pretty(output).unwrap_or_default();
        lines.push(format!("\nStructured Output:\n{pretty}"));
    }
    lines.join("\n")
}

fn tool_definitions() -> Value {
    json!([
        {
            "name": TOOL_CREATE_SESSION,
            "description": "Create a new Devin session with a prompt. Devin is an AI software engineer that can help with coding tasks, debugging, and building features.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "The task or prompt for Devin to work on"
                    },
                    "title": {
                        "type": "string",
                        "description": "Optional title for the session"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional tags for organizing sessions"
                    }
                },
                "required": ["prompt"]
            }
        },
        {
            "name": TOOL_SEND_MESSAGE,
            "description": "Send a follow-up message to an active Devin session. Use this to provide additional context, clarifications, or new instructions.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "sessionId": {
                        "type": "string",
                        "description": "The ID of the Devin session to send the message to"
                    },
                    "message": {
                        "type": "string",
                        "description": "The message to send to Devin"
                    }
                },
                "required": ["sessionId", "message"]
            }
        },
        {
            "name": TOOL_GET_STATUS,
            "description": "Get the current status of a Devin session, including any structured output or results.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "sessionId": {
                        "type": "string",
                        "description": "The ID of the Devin session to check"
                    }
                },
                "required": ["sessionId"]
            }
        }
    ])
}
