//! The game-state snapshot returned by `GET /state`.
//!
//! A [`GameState`] is never patched on the client. Each successful fetch
//! produces a fresh value that replaces the previous one wholesale, so all
//! structs here are plain data with lenient deserialization: unknown
//! fields are ignored and missing collections default to empty.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{Channel, Day, Intent, Season, TicketStatus};
use crate::ids::{AgentId, MessageId, VendorId};
use crate::social::SocialScore;

// ---------------------------------------------------------------------------
// Root snapshot
// ---------------------------------------------------------------------------

/// Full snapshot of the simulation as seen by one player.
///
/// Exactly one entry in [`laundromats`](Self::laundromats) belongs to the
/// local player; every other entry is a competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current week, starting at 1.
    #[serde(deserialize_with = "deserialize_week")]
    pub week: u32,
    /// Current day within the week.
    #[serde(default)]
    pub day: Day,
    /// Current season.
    #[serde(default)]
    pub season: Season,
    /// Every laundromat in the game keyed by owner.
    #[serde(default)]
    pub laundromats: BTreeMap<AgentId, Laundromat>,
    /// Narrative event log, most recent last.
    #[serde(default)]
    pub events: Vec<String>,
    /// Vendor catalog and supply-chain disruptions.
    #[serde(default)]
    pub market: Market,
    /// Inbox and public feed.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Sampled customer reactions, most recent last.
    #[serde(default)]
    pub customer_thoughts: Vec<CustomerThought>,
    /// Latest reasoning of each AI competitor.
    #[serde(default)]
    pub ai_thoughts: BTreeMap<AgentId, AiThought>,
}

fn deserialize_week<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let week = u32::deserialize(deserializer)?;
    if week == 0 {
        return Err(serde::de::Error::custom("week must be at least 1"));
    }
    Ok(week)
}

// ---------------------------------------------------------------------------
// Laundromat aggregate
// ---------------------------------------------------------------------------

/// One laundromat business. Only the server mutates these fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Laundromat {
    /// Owner of the laundromat.
    pub id: AgentId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Cash on hand.
    #[serde(default)]
    pub balance: Decimal,
    /// Price per wash.
    #[serde(default)]
    pub price: Decimal,
    /// Installed machines, including broken ones.
    #[serde(default)]
    pub machines: u32,
    /// Machines currently out of service.
    #[serde(default)]
    pub broken_machines: u32,
    /// Supplies on hand keyed by item name.
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
    /// Customer support tickets.
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    /// Reputation score in either wire shape.
    #[serde(default)]
    pub social_score: SocialScore,
    /// Revenue streams keyed by stream name.
    #[serde(default)]
    pub revenue_streams: BTreeMap<String, RevenueStream>,
}

impl Laundromat {
    /// Machines that can take customers right now.
    pub const fn working_machines(&self) -> u32 {
        self.machines.saturating_sub(self.broken_machines)
    }

    /// Number of tickets that still need attention.
    pub fn open_ticket_count(&self) -> usize {
        self.tickets
            .iter()
            .filter(|t| t.status != TicketStatus::Resolved)
            .count()
    }
}

/// A customer support issue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: String,
    /// Short description of the complaint.
    #[serde(default)]
    pub description: String,
    /// Current status.
    #[serde(default)]
    pub status: TicketStatus,
    /// Week the ticket was opened, if reported.
    #[serde(default)]
    pub week: Option<u32>,
}

/// A source of income such as washes, dry cleaning or vending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevenueStream {
    /// Category label (`"core"`, `"service"`, `"vending"`).
    #[serde(default)]
    pub category: String,
    /// Unit price, for priced streams.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Revenue earned last week.
    #[serde(default)]
    pub weekly_revenue: Decimal,
    /// Whether the stream is switched on.
    #[serde(default)]
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Vendor catalog plus ongoing supply-chain disruptions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Market {
    /// Vendors the player can buy from.
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    /// Active disruptions.
    #[serde(default, alias = "events")]
    pub supply_chain_events: Vec<SupplyChainEvent>,
}

/// A supplier of detergent, softener and parts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vendor {
    /// Vendor identifier.
    pub id: VendorId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Listed unit price keyed by item.
    #[serde(default)]
    pub prices: BTreeMap<String, Decimal>,
    /// Delivery reliability in `0.0..=1.0`, when disclosed.
    #[serde(default)]
    pub reliability: Option<f64>,
    /// Relationship score with the player, when disclosed.
    #[serde(default)]
    pub relationship: Option<f64>,
}

/// A disruption that changes prices or availability for a while.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplyChainEvent {
    /// Human-readable description.
    #[serde(default, alias = "message")]
    pub description: String,
    /// Item affected, if the event targets one.
    #[serde(default)]
    pub affected_item: Option<String>,
    /// Vendor affected, if the event targets one.
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    /// Weeks until the disruption ends.
    #[serde(default)]
    pub weeks_remaining: Option<u32>,
}

// ---------------------------------------------------------------------------
// Messages and thoughts
// ---------------------------------------------------------------------------

/// An immutable in-game message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Author.
    pub sender_id: AgentId,
    /// Addressee; the literal `"all"` for public posts.
    #[serde(default)]
    pub recipient_id: AgentId,
    /// Delivery channel.
    #[serde(default)]
    pub channel: Channel,
    /// Display tone.
    #[serde(default)]
    pub intent: Intent,
    /// Week the message was sent.
    #[serde(default)]
    pub week: u32,
    /// Day the message was sent.
    #[serde(default)]
    pub day: Day,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Whether the player has opened it.
    #[serde(default)]
    pub is_read: bool,
    /// Choices offered by dilemma-type messages.
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// One selectable choice attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attachment {
    /// Choice identifier sent back with the player's answer.
    #[serde(default)]
    pub id: String,
    /// Button label.
    #[serde(default)]
    pub label: String,
    /// Longer explanation of the consequences.
    #[serde(default)]
    pub description: Option<String>,
}

/// A customer's reaction, either bare text or attributed to a laundromat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerThought {
    /// Bare text.
    Text(String),
    /// Text with attribution.
    Detailed {
        /// The reaction itself.
        #[serde(alias = "thought")]
        text: String,
        /// Laundromat the customer visited.
        #[serde(default)]
        laundromat_id: Option<AgentId>,
        /// Customer name, when the server invents one.
        #[serde(default)]
        customer: Option<String>,
    },
}

impl CustomerThought {
    /// The reaction text regardless of shape.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Detailed { text, .. } => text,
        }
    }
}

/// Latest reasoning published by an AI competitor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiThought {
    /// Free-text reasoning.
    #[serde(default, alias = "thought")]
    pub summary: String,
    /// Actions the agent took this turn.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Week the thought was recorded.
    #[serde(default)]
    pub week: Option<u32>,
}
