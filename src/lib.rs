//! devin-bridge exposes the Devin agent API as an in-process MCP server and
//! provides the chat-side tool invocation lifecycle used to render and
//! approve MCP tool calls.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the tool-call records, the call/result classifier, the
//!   annotation index, and the approval gate with its keyboard accelerators.
//! - [`api`] is the upstream Devin REST client used by the bridged tools.
//! - [`mcp`] implements the in-process MCP server and the streamable-HTTP
//!   transport adapter that buffers its output into a single response.
//! - [`server`] wires the bridge into HTTP routes.
//!
//! The runtime entrypoint lives in the binary crate (`src/main.rs`), which
//! loads configuration, builds the router from [`server::create_router`],
//! and serves it.

pub mod api;
pub mod core;
pub mod mcp;
pub mod server;
