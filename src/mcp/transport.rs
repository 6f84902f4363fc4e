//! Streamable-HTTP server transport adapted onto a buffered response.
//!
//! The MCP transport wants to write a status line, headers, and body chunks
//! incrementally; the serving boundary wants exactly one fully-formed
//! response. [`BufferedResponse`] is the accumulator between the two: the
//! transport writes into it, and only once `end` is observed does the route
//! handler convert it into the outgoing HTTP response.

use crate::mcp::server::DevinMcpServer;
use rust_mcp_schema::RpcError;
use serde_json::{json, Value};
use tracing::debug;

pub const JSONRPC_VERSION: &str = "2.0";

/// Accumulator for a node-style write interface.
///
/// Writes after `end` are ignored, matching the contract of the callback
/// interface it stands in for.
#[derive(Debug)]
pub struct BufferedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    ended: bool,
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
            ended: false,
        }
    }

    pub fn set_status(&mut self, status: u16) {
        if !self.ended {
            self.status = status;
        }
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        if self.ended {
            return;
        }
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            existing.1 = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn append_body(&mut self, chunk: &[u8]) {
        if !self.ended {
            self.body.extend_from_slice(chunk);
        }
    }

    pub fn end(&mut self, chunk: Option<&[u8]>) {
        if self.ended {
            return;
        }
        if let Some(chunk) = chunk {
            self.body.extend_from_slice(chunk);
        }
        self.ended = true;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn into_parts(self) -> (u16, Vec<(String, String)>, Vec<u8>) {
        (self.status, self.headers, self.body)
    }
}

/// True when any entry of an Accept header names `text/event-stream`.
pub fn accepts_event_stream(accept: &str) -> bool {
    accept.split(',').any(|entry| {
        entry
            .split(';')
            .next()
            .map(str::trim)
            .is_some_and(|value| value.eq_ignore_ascii_case("text/event-stream"))
    })
}

pub fn error_envelope(code: i64, message: &str, id: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "error": { "code": code, "message": message },
        "id": id,
    })
}

/// Stateless streamable-HTTP server transport.
///
/// No session id is ever generated or required; each instance serves
/// exactly one HTTP exchange and is dropped afterwards together with its
/// server.
#[derive(Debug, Default)]
pub struct StreamableHttpServerTransport;

impl StreamableHttpServerTransport {
    pub fn new() -> Self {
        Self
    }

    /// Terminates one JSON-RPC message against the given server and writes
    /// the outcome into `response`.
    pub async fn handle_request(
        &self,
        accept: Option<&str>,
        body: &Value,
        server: &DevinMcpServer,
        response: &mut BufferedResponse,
    ) -> Result<(), String> {
        let Some(message) = body.as_object() else {
            // Batches were removed from the streamable-HTTP protocol; a
            // non-object body is rejected the same way as malformed JSON-RPC.
            write_bad_request(response, "Invalid Request");
            return Ok(());
        };

        if message.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            write_bad_request(response, "Invalid Request");
            return Ok(());
        }

        let Some(method) = message.get("method").and_then(Value::as_str) else {
            // A bare response/result message from the client; nothing to
            // route in a stateless exchange, acknowledge and move on.
            response.set_status(202);
            response.end(None);
            return Ok(());
        };

        let Some(id) = message.get("id") else {
            debug!(method = %method, "Accepted MCP notification");
            response.set_status(202);
            response.end(None);
            return Ok(());
        };
        let id = id.clone();

        let outcome = server.handle_request(method, message.get("params")).await;
        let envelope = match outcome {
            Ok(result) => json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": id,
                "result": result,
            }),
            Err(rpc_error) => rpc_error_envelope(rpc_error, id)?,
        };

        write_message(accept, response, &envelope)?;
        Ok(())
    }
}

fn rpc_error_envelope(error: RpcError, id: Value) -> Result<Value, String> {
    let error = serde_json::to_value(&error).map_err(|err| err.to_string())?;
    Ok(json!({
        "jsonrpc": JSONRPC_VERSION,
        "error": error,
        "id": id,
    }))
}

fn write_bad_request(response: &mut BufferedResponse, message: &str) {
    let envelope = error_envelope(-32600, message, Value::Null);
    response.set_status(400);
    response.set_header("Content-Type", "application/json");
    response.end(Some(envelope.to_string().as_bytes()));
}

fn write_message(
    accept: Option<&str>,
    response: &mut BufferedResponse,
    envelope: &Value,
) -> Result<(), String> {
    let payload = serde_json::to_string(envelope).map_err(|err| err.to_string())?;
    response.set_status(200);

    if accept.is_some_and(accepts_event_stream) {
        response.set_header("Content-Type", "text/event-stream");
        response.set_header("Cache-Control", "no-cache");
        response.append_body(b"event: message\n");
        response.append_body(format!("data: {payload}\n\n").as_bytes());
        response.end(None);
    } else {
        response.set_header("Content-Type", "application/json");
        response.end(Some(payload.as_bytes()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DevinClient;

    fn test_server() -> DevinMcpServer {
        DevinMcpServer::new(DevinClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "key",
        ))
    }

    fn body_json(response: BufferedResponse) -> (u16, Value) {
        let (status, _, body) = response.into_parts();
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[test]
    fn buffered_response_accumulates_until_end() {
        let mut response = BufferedResponse::new();
        response.set_status(200);
        response.set_header("Content-Type", "application/json");
        response.append_body(b"{\"a\":");
        response.append_body(b"1}");
        assert!(!response.is_ended());

        response.end(None);
        assert!(response.is_ended());

        // Writes after end are dropped.
        response.append_body(b"garbage");
        response.set_status(500);

        let (status, headers, body) = response.into_parts();
        assert_eq!(status, 200);
        assert_eq!(body, b"{\"a\":1}");
        assert_eq!(headers, vec![("Content-Type".to_string(), "application/json".to_string())]);
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut response = BufferedResponse::new();
        response.set_header("content-type", "text/plain");
        response.set_header("Content-Type", "application/json");

        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
        let (_, headers, _) = response.into_parts();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn accept_header_detection() {
        assert!(accepts_event_stream("text/event-stream"));
        assert!(accepts_event_stream(
            "application/json, text/event-stream;q=0.9"
        ));
        assert!(!accepts_event_stream("application/json"));
    }

    #[tokio::test]
    async fn notification_is_accepted_with_empty_body() {
        let server = test_server();
        let transport = StreamableHttpServerTransport::new();
        let mut response = BufferedResponse::new();
        let body = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });

        transport
            .handle_request(None, &body, &server, &mut response)
            .await
            .unwrap();

        let (status, _, body) = response.into_parts();
        assert_eq!(status, 202);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn invalid_envelope_is_rejected_with_400() {
        let server = test_server();
        let transport = StreamableHttpServerTransport::new();
        let mut response = BufferedResponse::new();
        let body = json!({ "method": "tools/list", "id": 1 });

        transport
            .handle_request(None, &body, &server, &mut response)
            .await
            .unwrap();

        let (status, envelope) = body_json(response);
        assert_eq!(status, 400);
        assert_eq!(envelope["error"]["code"], -32600);
        assert_eq!(envelope["id"], Value::Null);
    }

    #[tokio::test]
    async fn batch_bodies_are_rejected() {
        let server = test_server();
        let transport = StreamableHttpServerTransport::new();
        let mut response = BufferedResponse::new();
        let body = json!([{ "jsonrpc": "2.0", "method": "ping", "id": 1 }]);

        transport
            .handle_request(None, &body, &server, &mut response)
            .await
            .unwrap();

        let (status, envelope) = body_json(response);
        assert_eq!(status, 400);
        assert_eq!(envelope["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn request_gets_a_json_success_envelope() {
        let server = test_server();
        let transport = StreamableHttpServerTransport::new();
        let mut response = BufferedResponse::new();
        let body = json!({ "jsonrpc": "2.0", "method": "tools/list", "id": 7 });

        transport
            .handle_request(Some("application/json"), &body, &server, &mut response)
            .await
            .unwrap();

        assert_eq!(response.header("Content-Type"), Some("application/json"));
        let (status, envelope) = body_json(response);
        assert_eq!(status, 200);
        assert_eq!(envelope["jsonrpc"], "2.0");
        assert_eq!(envelope["id"], 7);
        assert_eq!(envelope["result"]["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn event_stream_accept_gets_sse_frames() {
        let server = test_server();
        let transport = StreamableHttpServerTransport::new();
        let mut response = BufferedResponse::new();
        let body = json!({ "jsonrpc": "2.0", "method": "ping", "id": 1 });

        transport
            .handle_request(
                Some("application/json, text/event-stream"),
                &body,
                &server,
                &mut response,
            )
            .await
            .unwrap();

        assert_eq!(response.header("Content-Type"), Some("text/event-stream"));
        let (status, _, body) = response.into_parts();
        assert_eq!(status, 200);
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("event: message\n"));
        let data_line = text
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .expect("data line");
        let envelope: Value = serde_json::from_str(data_line).unwrap();
        assert_eq!(envelope["id"], 1);
    }

    #[tokio::test]
    async fn unknown_method_becomes_a_jsonrpc_error_envelope() {
        let server = test_server();
        let transport = StreamableHttpServerTransport::new();
        let mut response = BufferedResponse::new();
        let body = json!({ "jsonrpc": "2.0", "method": "prompts/list", "id": 2 });

        transport
            .handle_request(None, &body, &server, &mut response)
            .await
            .unwrap();

        let (status, envelope) = body_json(response);
        assert_eq!(status, 200);
        assert_eq!(envelope["error"]["code"], -32601);
        assert_eq!(envelope["id"], 2);
    }
}
