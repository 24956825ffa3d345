// Team budget accounting and squad counters.

use serde::{Deserialize, Serialize};

use super::player::{Player, Role};

/// A franchise participating in the auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub team_name: String,
    /// Full budget granted at setup; never changes during the auction.
    pub total_points: i64,
    pub points_used: i64,
    /// Always `total_points - points_used`; recomputed on every write.
    pub points_left: i64,
    /// Players acquired so far (purchases and retentions).
    pub players_count: u32,
    /// Squad slots still to fill.
    pub balance_players_count: u32,
    pub max_players: u32,
    pub max_retain_players: u32,
    pub retained_players_count: u32,
    /// Assigned by the group lottery; cleared on auction reset.
    pub group_name: Option<String>,
}

impl Team {
    /// A fresh team with full budget and an empty squad.
    pub fn new(
        id: i64,
        team_name: impl Into<String>,
        total_points: i64,
        max_players: u32,
        max_retain_players: u32,
    ) -> Self {
        Team {
            id,
            team_name: team_name.into(),
            total_points,
            points_used: 0,
            points_left: total_points,
            players_count: 0,
            balance_players_count: max_players,
            max_players,
            max_retain_players,
            retained_players_count: 0,
            group_name: None,
        }
    }

    pub fn budget_consistent(&self) -> bool {
        self.points_left == self.total_points - self.points_used
    }

    pub fn has_squad_slot(&self) -> bool {
        self.players_count < self.max_players
    }

    pub fn has_retention_slot(&self) -> bool {
        self.retained_players_count < self.max_retain_players
    }

    /// Apply the counter deltas of acquiring a player for `amount`
    /// points. Used by both sale finalization and retention.
    pub fn apply_purchase(&mut self, amount: i64) {
        self.points_used += amount;
        self.points_left = self.total_points - self.points_used;
        self.players_count += 1;
        self.balance_players_count = self.balance_players_count.saturating_sub(1);
    }

    /// Reverse a previous `apply_purchase`. Used by saga compensation
    /// and by retention re-assignment.
    pub fn revert_purchase(&mut self, amount: i64) {
        self.points_used -= amount;
        self.points_left = self.total_points - self.points_used;
        self.players_count = self.players_count.saturating_sub(1);
        self.balance_players_count = (self.balance_players_count + 1).min(self.max_players);
    }

    /// Reset to a fresh squad with the configured capacities.
    pub fn reset(&mut self) {
        self.points_used = 0;
        self.points_left = self.total_points;
        self.players_count = 0;
        self.balance_players_count = self.max_players;
        self.retained_players_count = 0;
        self.group_name = None;
    }
}

/// Count a team's acquired players per role, in display order.
/// Roles with no players are included with a zero count.
pub fn role_distribution(players: &[Player]) -> Vec<(Role, u32)> {
    Role::all()
        .into_iter()
        .map(|role| {
            let count = players.iter().filter(|p| p.role == role).count() as u32;
            (role, count)
        })
        .collect()
}
