//! # MCP Handler Module
//!
//! Implements the Model Context Protocol for the faucet server and dispatches
//! tool calls to [`FaucetService`](crate::blockchain::services::faucet::FaucetService).
//!
//! ## Supported Tools
//!
//! - `claim_for_user` - Claim a share of the faucet for a recipient
//! - `fund_faucet` - Send tokens into the faucet
//! - `emergency_withdraw` - Owner-only withdrawal
//! - `get_faucet_balance` - Current faucet balance
//! - `get_time_until_next_claim` - Cooldown left for a user
//!
//! camelCase aliases (`claimForUser`, `getTimeUntilNextClaim`, ...) are
//! accepted as well.

use crate::{
    blockchain::models::{ClaimParameters, FundParameters, UserAddressParameters},
    mcp::protocol::{error_codes, Request, Response},
    utils, AppState,
};
use serde_json::{json, Value};
use tracing::info;

/// The faucet tools exposed over MCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetTool {
    ClaimForUser,
    FundFaucet,
    EmergencyWithdraw,
    GetFaucetBalance,
    GetTimeUntilNextClaim,
}

impl FaucetTool {
    /// Resolve a tool name or one of its aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "claim_for_user" | "claimForUser" => Some(Self::ClaimForUser),
            "fund_faucet" | "fundFaucet" => Some(Self::FundFaucet),
            "emergency_withdraw" | "emergencyWithdraw" => Some(Self::EmergencyWithdraw),
            "get_faucet_balance" | "getFaucetBalance" => Some(Self::GetFaucetBalance),
            "get_time_until_next_claim" | "getTimeUntilNextClaim" => Some(Self::GetTimeUntilNextClaim),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ClaimForUser => "claim_for_user",
            Self::FundFaucet => "fund_faucet",
            Self::EmergencyWithdraw => "emergency_withdraw",
            Self::GetFaucetBalance => "get_faucet_balance",
            Self::GetTimeUntilNextClaim => "get_time_until_next_claim",
        }
    }
}

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Direct method calls are rewritten into tools/call to reuse the same logic
        method if FaucetTool::from_name(method).is_some() => {
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": method,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let requested = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let tool = match FaucetTool::from_name(requested) {
        Some(t) => t,
        None => {
            return Response::error(
                req.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Tool not found: {}", requested),
            )
        }
    };

    let args = params.get("arguments").cloned().unwrap_or(Value::Null);
    let req_id = &req.id;
    let faucet = &state.faucet;

    let res: Result<String, Response> = (async {
        let text = match tool {
            FaucetTool::ClaimForUser => {
                let p: ClaimParameters = utils::parse_tool_args(&args, req_id)?;
                faucet.claim_for_user(p).await
            }
            FaucetTool::FundFaucet => {
                let p: FundParameters = utils::parse_tool_args(&args, req_id)?;
                faucet.fund_faucet(p).await
            }
            FaucetTool::EmergencyWithdraw => {
                let p: FundParameters = utils::parse_tool_args(&args, req_id)?;
                faucet.emergency_withdraw(p).await
            }
            FaucetTool::GetFaucetBalance => faucet.get_faucet_balance().await,
            FaucetTool::GetTimeUntilNextClaim => {
                let p: UserAddressParameters = utils::parse_tool_args(&args, req_id)?;
                faucet.get_time_until_next_claim(p).await
            }
        };
        Ok(text)
    })
    .await;

    match res {
        Ok(text) => {
            info!("Tool {} -> {}", tool.name(), text);
            Response::tool_text(req.id.clone(), tool.name(), text)
        }
        Err(e) => e,
    }
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "esusu_faucet_mcp",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "Faucet MCP server: claim faucet tokens for users, fund the faucet, and check balances and cooldowns.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let address = json!({"type": "string", "pattern": "^0x[a-fA-F0-9]{40}$"});
    let tools = json!([
        {
            "name": "claim_for_user",
            "description": "Claim tokens from the faucet for a specific user. Reports the remaining cooldown if the user claimed recently.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "recipient": merge(&address, "Recipient address for the claimed tokens."),
                    "amount": {"type": "integer", "minimum": 1, "maximum": 20, "description": "Percentage amount to claim from the faucet (1-20%)."}
                },
                "required": ["recipient"]
            }
        },
        {
            "name": "fund_faucet",
            "description": "Fund the faucet with tokens from the server wallet.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "amount": {"type": "string", "description": "Token amount in base units (decimal string)."}
                },
                "required": ["amount"]
            }
        },
        {
            "name": "emergency_withdraw",
            "description": "Emergency withdraw tokens from the faucet (owner only).",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "amount": {"type": "string", "description": "Token amount in base units (decimal string)."}
                },
                "required": ["amount"]
            }
        },
        {
            "name": "get_faucet_balance",
            "description": "Get the current balance of the faucet.",
            "inputSchema": {"type": "object", "properties": {}}
        },
        {
            "name": "get_time_until_next_claim",
            "description": "Get the time until the next claim for a specific user.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "userAddress": merge(&address, "The user's wallet address.")
                },
                "required": ["userAddress"]
            }
        }
    ]);
    Response::success(req.id.clone(), json!({ "tools": tools }))
}

fn merge(schema: &Value, description: &str) -> Value {
    let mut s = schema.clone();
    if let Value::Object(map) = &mut s {
        map.insert("description".into(), json!(description));
    }
    s
}
