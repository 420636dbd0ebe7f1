//! Auxiliary reports fetched on demand.
//!
//! Credit, zone and calendar reports are not part of the turn loop. The
//! client caches each one in its own slot and replaces it whole on every
//! successful fetch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::Day;
use crate::ids::{AgentId, ScheduledActionId};

/// Creditworthiness of the player's business.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreditReport {
    /// Numeric credit score.
    #[serde(default)]
    pub score: u32,
    /// Letter rating (`"A"`, `"BB"`, ...).
    #[serde(default)]
    pub rating: String,
    /// Maximum amount the bank will lend.
    #[serde(default)]
    pub credit_limit: Decimal,
    /// Sum of all outstanding loan balances.
    #[serde(default)]
    pub outstanding_debt: Decimal,
    /// Individual loans.
    #[serde(default)]
    pub loans: Vec<Loan>,
}

/// A loan on the player's books.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Loan {
    /// Loan identifier.
    #[serde(default)]
    pub id: String,
    /// Amount originally borrowed.
    #[serde(default)]
    pub principal: Decimal,
    /// Amount still owed.
    #[serde(default)]
    pub balance: Decimal,
    /// Weekly interest rate as a fraction.
    #[serde(default)]
    pub interest_rate: f64,
    /// Weeks left on the term.
    #[serde(default)]
    pub weeks_remaining: u32,
}

/// Neighborhood the player's laundromat operates in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Zone name.
    #[serde(default)]
    pub name: String,
    /// Flavor text.
    #[serde(default)]
    pub description: String,
    /// Relative foot traffic, 1.0 being average.
    #[serde(default)]
    pub foot_traffic: f64,
    /// Weekly rent.
    #[serde(default)]
    pub rent: Decimal,
    /// Other laundromats in the same zone.
    #[serde(default)]
    pub competitors: Vec<AgentId>,
}

/// The player's scheduled actions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Calendar {
    /// Entries in execution order.
    #[serde(default, alias = "actions")]
    pub scheduled_actions: Vec<ScheduledAction>,
}

/// An action the server will execute on a future day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduledAction {
    /// Entry identifier; empty when the entry has not been created yet.
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: ScheduledActionId,
    /// Action type dispatched when the entry fires.
    pub action_type: String,
    /// Parameters passed with the action.
    #[serde(default)]
    pub parameters: serde_json::Value,
    /// Week the entry fires.
    pub week: u32,
    /// Day the entry fires.
    #[serde(default)]
    pub day: Day,
    /// Whether the entry repeats every week.
    #[serde(default)]
    pub recurring: bool,
    /// Optional note shown in the calendar.
    #[serde(default)]
    pub description: Option<String>,
}

fn is_unassigned(id: &ScheduledActionId) -> bool {
    id.as_str().is_empty()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn calendar_accepts_actions_alias() {
        let json = serde_json::json!({
            "actions": [{"id": "c1", "action_type": "MAINTENANCE", "week": 5, "day": "Friday"}]
        });
        let calendar: Calendar = serde_json::from_value(json).unwrap();
        assert_eq!(calendar.scheduled_actions.len(), 1);
        assert_eq!(
            calendar.scheduled_actions.first().map(|a| a.day),
            Some(Day::Friday)
        );
    }

    #[test]
    fn new_scheduled_action_omits_id() {
        let action = ScheduledAction {
            action_type: "MARKETING".to_owned(),
            week: 4,
            ..ScheduledAction::default()
        };
        let json = serde_json::to_value(&action).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json.get("week"), Some(&serde_json::json!(4)));
    }
}
