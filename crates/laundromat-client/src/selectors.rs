//! Pure read-only projections over a cached [`GameState`].
//!
//! A [`GameView`] pairs an optional snapshot with the local player's id.
//! Every accessor is total: with no snapshot loaded it returns `None` or
//! an empty collection, so consumers only ever check for "no game yet"
//! once, at the top.

use std::collections::BTreeMap;

use laundromat_types::{
    AgentId, AiThought, CustomerThought, Day, GameState, Laundromat, Message, Season,
    SupplyChainEvent, Vendor,
};

static NO_THOUGHTS: BTreeMap<AgentId, AiThought> = BTreeMap::new();

/// Borrowed view of one snapshot from the local player's perspective.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    state: Option<&'a GameState>,
    player_id: &'a AgentId,
}

impl<'a> GameView<'a> {
    /// Wrap a snapshot (or its absence) for `player_id`.
    pub const fn new(state: Option<&'a GameState>, player_id: &'a AgentId) -> Self {
        Self { state, player_id }
    }

    /// Whether a snapshot has been loaded.
    pub const fn is_loaded(&self) -> bool {
        self.state.is_some()
    }

    /// Current week, day and season.
    pub fn calendar_position(&self) -> Option<(u32, Day, Season)> {
        self.state.map(|s| (s.week, s.day, s.season))
    }

    /// The local player's laundromat.
    pub fn player_laundromat(&self) -> Option<&'a Laundromat> {
        self.state?.laundromats.get(self.player_id)
    }

    /// Every laundromat except the player's, in map order.
    pub fn competitors(&self) -> Vec<&'a Laundromat> {
        let player_id = self.player_id;
        self.state
            .map(|s| {
                s.laundromats
                    .iter()
                    .filter(|(id, _)| *id != player_id)
                    .map(|(_, laundromat)| laundromat)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Vendors in the market catalog.
    pub fn vendors(&self) -> &'a [Vendor] {
        self.state.map(|s| s.market.vendors.as_slice()).unwrap_or_default()
    }

    /// Active supply-chain disruptions.
    pub fn supply_chain_events(&self) -> &'a [SupplyChainEvent] {
        self.state
            .map(|s| s.market.supply_chain_events.as_slice())
            .unwrap_or_default()
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &'a [Message] {
        self.state.map(|s| s.messages.as_slice()).unwrap_or_default()
    }

    /// Number of messages the player has not opened.
    pub fn unread_message_count(&self) -> usize {
        self.messages().iter().filter(|m| !m.is_read).count()
    }

    /// Latest reasoning of each AI competitor.
    pub fn ai_thoughts(&self) -> &'a BTreeMap<AgentId, AiThought> {
        self.state.map_or(&NO_THOUGHTS, |s| &s.ai_thoughts)
    }

    /// Narrative event log, most recent last.
    pub fn events(&self) -> &'a [String] {
        self.state.map(|s| s.events.as_slice()).unwrap_or_default()
    }

    /// Sampled customer reactions.
    pub fn customer_thoughts(&self) -> &'a [CustomerThought] {
        self.state.map(|s| s.customer_thoughts.as_slice()).unwrap_or_default()
    }
}
