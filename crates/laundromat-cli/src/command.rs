//! Command-line parsing.

use clap::{Parser, Subcommand};
use laundromat_types::{AgentId, Channel, Intent, VendorId};

/// Drive a Laundromat Tycoon game from the terminal.
#[derive(Debug, Parser)]
#[command(name = "laundromat")]
#[command(about = "Drive a Laundromat Tycoon game against the simulation server", long_about = None)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// One invocation of the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch and summarize the current game
    State,
    /// Advance one week
    NextTurn,
    /// Advance one day
    NextDay,
    /// Dispatch a gameplay action
    Action {
        /// Action type, e.g. `SET_PRICE`
        #[arg(value_name = "TYPE")]
        action_type: String,
        /// JSON object of parameters
        #[arg(value_name = "JSON", default_value = "{}", value_parser = parse_json)]
        parameters: serde_json::Value,
    },
    /// Send an in-game message
    Message {
        /// Recipient agent id
        #[arg(value_name = "RECIPIENT", value_parser = parse_agent)]
        recipient: AgentId,
        /// Message body
        #[arg(value_name = "TEXT")]
        text: String,
        /// Channel: dm, public, formal or system
        #[arg(long, default_value = "dm", value_parser = parse_wire::<Channel>)]
        channel: Channel,
        /// Intent, e.g. neutral, friendly, proposal, threat
        #[arg(long, default_value = "neutral", value_parser = parse_wire::<Intent>)]
        intent: Intent,
    },
    /// Make a fixed-form offer to a vendor
    Negotiate {
        /// Vendor id
        #[arg(value_name = "VENDOR", value_parser = parse_vendor)]
        vendor: VendorId,
        /// Item to negotiate
        #[arg(value_name = "ITEM")]
        item: String,
    },
    /// Pitch a vendor in free text
    Chat {
        /// Vendor id
        #[arg(value_name = "VENDOR", value_parser = parse_vendor)]
        vendor: VendorId,
        /// Item to negotiate
        #[arg(value_name = "ITEM")]
        item: String,
        /// Pitch text
        #[arg(value_name = "TEXT")]
        text: String,
    },
    /// Show prior negotiation turns with a vendor
    History {
        /// Vendor id
        #[arg(value_name = "VENDOR", value_parser = parse_vendor)]
        vendor: VendorId,
        /// Item negotiated
        #[arg(value_name = "ITEM")]
        item: String,
    },
    /// Fetch the credit report
    Credit,
    /// Fetch the zone report
    Zone,
    /// Fetch the calendar
    Calendar,
    /// Start a new game
    Reset,
    /// Load a named scenario
    Scenario {
        /// Scenario name
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Auto-play until TURNS weeks pass, or until ctrl-c
    Autoplay {
        /// Weeks to play before stopping
        #[arg(value_name = "TURNS", value_parser = clap::value_parser!(u32).range(1..))]
        turns: Option<u32>,
    },
}

fn parse_json(raw: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON parameters: {e}"))
}

fn parse_agent(raw: &str) -> Result<AgentId, String> {
    non_empty(raw).map(AgentId::from)
}

fn parse_vendor(raw: &str) -> Result<VendorId, String> {
    non_empty(raw).map(VendorId::from)
}

fn non_empty(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err("id must not be empty".to_owned())
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Parse an enum through its serde wire name.
fn parse_wire<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
        .map_err(|e| format!("unrecognized value `{raw}`: {e}"))
}
