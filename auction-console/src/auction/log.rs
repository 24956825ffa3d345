// Append-only auction log records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a log row records: a standing bid or a completed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Bid,
    Sold,
}

impl LogAction {
    pub fn from_str_action(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bid" => Some(LogAction::Bid),
            "sold" => Some(LogAction::Sold),
            _ => None,
        }
    }

    pub fn storage_str(&self) -> &'static str {
        match self {
            LogAction::Bid => "bid",
            LogAction::Sold => "sold",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_str())
    }
}

/// A persisted audit-trail row. Rows are never updated; the trail is
/// cleared only by the admin reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionLogEntry {
    pub id: i64,
    pub player_id: i64,
    /// Name snapshot, so the trail reads correctly even if the player
    /// row is later deleted.
    pub player_name: String,
    pub team_id: i64,
    pub team_name: String,
    pub bid_amount: i64,
    pub action: LogAction,
    pub created_at: String,
}

/// Pre-insert payload; the database assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogDraft {
    pub player_id: i64,
    pub player_name: String,
    pub team_id: i64,
    pub team_name: String,
    pub bid_amount: i64,
    pub action: LogAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_roundtrip() {
        assert_eq!(LogAction::from_str_action("bid"), Some(LogAction::Bid));
        assert_eq!(LogAction::from_str_action("sold"), Some(LogAction::Sold));
        assert_eq!(LogAction::from_str_action("SOLD"), Some(LogAction::Sold));
        assert_eq!(LogAction::from_str_action("retained"), None);
        for action in [LogAction::Bid, LogAction::Sold] {
            assert_eq!(LogAction::from_str_action(action.storage_str()), Some(action));
        }
    }
}
