pub mod server;
pub mod transport;

pub const MCP_SERVER_NAME: &str = "devin-mcp-server";
pub const MCP_SERVER_VERSION: &str = "1.0.0";

pub const TOOL_CREATE_SESSION: &str = "devin_create_session";
pub const TOOL_SEND_MESSAGE: &str = "devin_send_message";
pub const TOOL_GET_STATUS: &str = "devin_get_status";
