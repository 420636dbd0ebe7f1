//! Shared type definitions for the Laundromat Tycoon client.
//!
//! This crate is the single source of truth for the JSON shapes exchanged
//! with the remote simulation server. Every type here is a read-only
//! snapshot: the server owns the game rules and the client only ever
//! replaces these values wholesale.
//!
//! # Modules
//!
//! - [`ids`] -- String-backed identifier wrappers for agents, vendors, messages
//! - [`enums`] -- Calendar, channel, intent and ticket enumerations
//! - [`state`] -- The [`GameState`] snapshot and the laundromat aggregate
//! - [`social`] -- Polymorphic social score and its normalization
//! - [`reports`] -- Auxiliary credit, zone and calendar reports
//! - [`commands`] -- Request envelopes and command responses

pub mod commands;
pub mod enums;
pub mod ids;
pub mod reports;
pub mod social;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use commands::{
    ActionEnvelope, ActionResponse, NegotiateChatRequest, NegotiateRequest, NegotiationChatReply,
    NegotiationOutcome, NegotiationTurn, ScenarioRequest,
};
pub use enums::{ActiveTab, Channel, Day, Intent, Season, TicketStatus};
pub use ids::{AgentId, MessageId, ScheduledActionId, VendorId};
pub use reports::{Calendar, CreditReport, Loan, ScheduledAction, ZoneInfo};
pub use social::{NormalizedSocialScore, SocialScore, SocialTier};
pub use state::{
    AiThought, Attachment, CustomerThought, GameState, Laundromat, Market, Message,
    RevenueStream, SupplyChainEvent, Ticket, Vendor,
};
