//! Request envelopes and command responses.
//!
//! Every gameplay command (pricing, hiring, maintenance, marketing,
//! messaging) travels in the same [`ActionEnvelope`]: the client does not
//! model individual actions, it forwards an action type and a parameter
//! object and lets the server validate them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, VendorId};

// ---------------------------------------------------------------------------
// Generic action dispatch
// ---------------------------------------------------------------------------

/// Body of `POST /action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Agent issuing the command.
    pub agent_id: AgentId,
    /// Upper-snake-case action name (e.g. `SET_PRICE`).
    pub action_type: String,
    /// Free-form parameters, validated by the server.
    pub parameters: serde_json::Value,
}

/// Body returned by `POST /action`.
///
/// Servers that reject an action with a 2xx status report it through
/// `success: false`; an empty body counts as success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Whether the server applied the action.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Explanation, mostly present on rejection.
    #[serde(default)]
    pub message: Option<String>,
}

impl Default for ActionResponse {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

const fn default_success() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Negotiation
// ---------------------------------------------------------------------------

/// Body of `POST /negotiate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiateRequest {
    /// Negotiating agent.
    pub agent_id: AgentId,
    /// Vendor being negotiated with.
    pub vendor_id: VendorId,
    /// Item under negotiation.
    pub item: String,
}

/// The vendor's decision on a negotiation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    /// Whether the vendor accepted.
    #[serde(default)]
    pub accepted: bool,
    /// Price the vendor offers, if any.
    #[serde(default)]
    pub offered_price: Option<Decimal>,
    /// Vendor's explanation.
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /negotiate/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiateChatRequest {
    /// Negotiating agent.
    pub agent_id: AgentId,
    /// Vendor being negotiated with.
    pub vendor_id: VendorId,
    /// Item under negotiation.
    pub item: String,
    /// Free-text pitch from the player.
    pub message: String,
}

/// Vendor reply in a free-text negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegotiationChatReply {
    /// What the vendor said.
    #[serde(default)]
    pub vendor_response: String,
    /// Price on the table after this exchange.
    #[serde(default)]
    pub offered_price: Option<Decimal>,
    /// Whether the deal closed.
    #[serde(default)]
    pub accepted: bool,
}

/// One exchange from `GET /negotiate/history/{vendor}/{agent}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegotiationTurn {
    /// Who spoke: `"player"` or `"vendor"`.
    #[serde(default, alias = "role")]
    pub speaker: String,
    /// What was said.
    #[serde(default)]
    pub message: String,
    /// Price quoted in this turn, if any.
    #[serde(default)]
    pub offered_price: Option<Decimal>,
    /// Week of the exchange.
    #[serde(default)]
    pub week: Option<u32>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Body of `POST /start_scenario`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    /// Name of the scenario to load.
    pub scenario_name: String,
}
