//! Enumeration types for the Laundromat Tycoon client.
//!
//! Calendar values arrive from the server as capitalized names
//! (`"Monday"`, `"Spring"`); lowercase spellings are accepted as aliases.
//! Message channels and intents are lowercase strings.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Day of the in-game week.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Day {
    /// First day of the week.
    #[default]
    #[serde(alias = "monday")]
    Monday,
    /// Second day of the week.
    #[serde(alias = "tuesday")]
    Tuesday,
    /// Third day of the week.
    #[serde(alias = "wednesday")]
    Wednesday,
    /// Fourth day of the week.
    #[serde(alias = "thursday")]
    Thursday,
    /// Fifth day of the week.
    #[serde(alias = "friday")]
    Friday,
    /// Sixth day of the week.
    #[serde(alias = "saturday")]
    Saturday,
    /// Last day of the week. Advancing past it starts a new week.
    #[serde(alias = "sunday")]
    Sunday,
}

impl Day {
    /// All days in calendar order.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Zero-based position within the week.
    pub const fn index(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// The following day, wrapping Sunday back to Monday.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Monday => Self::Tuesday,
            Self::Tuesday => Self::Wednesday,
            Self::Wednesday => Self::Thursday,
            Self::Thursday => Self::Friday,
            Self::Friday => Self::Saturday,
            Self::Saturday => Self::Sunday,
            Self::Sunday => Self::Monday,
        }
    }

    /// Three-letter label used in compact status lines.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }
}

/// Season of the in-game year. Drives demand on the server side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Season {
    /// Opening season.
    #[default]
    #[serde(alias = "spring")]
    Spring,
    /// Peak foot traffic.
    #[serde(alias = "summer")]
    Summer,
    /// Back-to-school season.
    #[serde(alias = "fall", alias = "Autumn", alias = "autumn")]
    Fall,
    /// Heavy-garment season.
    #[serde(alias = "winter")]
    Winter,
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// Delivery channel of an in-game message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Direct message between two agents.
    #[default]
    Dm,
    /// Broadcast visible to every agent.
    Public,
    /// Formal proposal or contract.
    Formal,
    /// Notice generated by the simulation itself.
    System,
}

impl Channel {
    /// Wire name of the channel.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dm => "dm",
            Self::Public => "public",
            Self::Formal => "formal",
            Self::System => "system",
        }
    }
}

/// Tone of a message. Only governs how a message is displayed.
///
/// Intents the client does not know about deserialize as [`Intent::Other`]
/// so a newer server never breaks an older client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Plain informational message.
    #[default]
    Neutral,
    /// Cooperative or friendly overture.
    Friendly,
    /// Offer of a deal or partnership.
    Proposal,
    /// Explicit threat from a competitor.
    Threat,
    /// Warning about an upcoming problem.
    Warning,
    /// A choice the player has to make; carries attachments.
    Dilemma,
    /// Announcement from the simulation.
    Announcement,
    /// Any intent not listed above.
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Lifecycle of a customer support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Not yet handled.
    #[default]
    Open,
    /// Being worked on.
    InProgress,
    /// Closed.
    Resolved,
}

// ---------------------------------------------------------------------------
// Client-only UI state
// ---------------------------------------------------------------------------

/// Which top-level panel is showing. Never sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveTab {
    /// Overview of the player's laundromat.
    #[default]
    Dashboard,
    /// Machines, staff and tickets.
    Operations,
    /// Vendors and supply chain.
    Market,
    /// Inbox.
    Messages,
    /// Rival laundromats and AI thoughts.
    Competitors,
    /// Scheduled actions.
    Calendar,
    /// Credit and revenue.
    Finance,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn day_wraps_after_sunday() {
        assert_eq!(Day::Sunday.next(), Day::Monday);
        assert_eq!(Day::Monday.next(), Day::Tuesday);
        for (i, day) in Day::ALL.iter().enumerate() {
            assert_eq!(usize::from(day.index()), i);
        }
    }

    #[test]
    fn calendar_accepts_lowercase_aliases() {
        let day: Day = serde_json::from_str("\"friday\"").unwrap();
        assert_eq!(day, Day::Friday);
        let season: Season = serde_json::from_str("\"Autumn\"").unwrap();
        assert_eq!(season, Season::Fall);
    }

    #[test]
    fn unknown_intent_falls_back_to_other() {
        let intent: Intent = serde_json::from_str("\"bribe\"").unwrap();
        assert_eq!(intent, Intent::Other);
        let known: Intent = serde_json::from_str("\"dilemma\"").unwrap();
        assert_eq!(known, Intent::Dilemma);
    }

    #[test]
    fn channel_round_trips_lowercase() {
        let json = serde_json::to_string(&Channel::Formal).unwrap();
        assert_eq!(json, "\"formal\"");
        assert_eq!(Channel::Formal.as_str(), "formal");
    }
}
