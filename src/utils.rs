//! Utility functions for the faucet MCP server

use crate::mcp::protocol::{error_codes, Response};
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

/// Deserialize a tool's `arguments` object into its parameter struct.
/// A missing object is treated as `{}` so optional-only tools still work.
pub fn parse_tool_args<T: DeserializeOwned>(args: &Value, req_id: &Value) -> Result<T, Response> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args.clone()
    };
    from_value(args).map_err(|e| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Invalid tool arguments: {}", e),
        )
    })
}
