// Player records and role taxonomy for the auction pool.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playing role of a player in the auction pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batsman,
    Bowler,
    Allrounder,
    Wicketkeeper,
}

impl Role {
    /// Parse a role string into a Role enum.
    ///
    /// Handles both the storage form ("allrounder") and the display forms
    /// seen in registration sheets ("All-Rounder", "Wicket Keeper"),
    /// ignoring case, whitespace, and punctuation.
    pub fn from_str_role(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "batsman" | "batter" => Some(Role::Batsman),
            "bowler" => Some(Role::Bowler),
            "allrounder" => Some(Role::Allrounder),
            "wicketkeeper" | "keeper" | "wk" => Some(Role::Wicketkeeper),
            _ => None,
        }
    }

    /// The lowercase form stored in the database and CSV files.
    pub fn storage_str(&self) -> &'static str {
        match self {
            Role::Batsman => "batsman",
            Role::Bowler => "bowler",
            Role::Allrounder => "allrounder",
            Role::Wicketkeeper => "wicketkeeper",
        }
    }

    /// Return the display string for this role.
    pub fn display_str(&self) -> &'static str {
        match self {
            Role::Batsman => "Batsman",
            Role::Bowler => "Bowler",
            Role::Allrounder => "All-Rounder",
            Role::Wicketkeeper => "Wicket-Keeper",
        }
    }

    /// Deterministic ordering index for squad displays and summaries.
    pub fn sort_order(&self) -> u8 {
        match self {
            Role::Batsman => 0,
            Role::Wicketkeeper => 1,
            Role::Allrounder => 2,
            Role::Bowler => 3,
        }
    }

    /// All roles in display order.
    pub fn all() -> [Role; 4] {
        [Role::Batsman, Role::Wicketkeeper, Role::Allrounder, Role::Bowler]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Where a player stands in the auction lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    #[default]
    Available,
    Unsold,
    Sold,
}

impl PlayerStatus {
    pub fn from_str_status(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(PlayerStatus::Available),
            "unsold" => Some(PlayerStatus::Unsold),
            "sold" => Some(PlayerStatus::Sold),
            _ => None,
        }
    }

    pub fn storage_str(&self) -> &'static str {
        match self {
            PlayerStatus::Available => "available",
            PlayerStatus::Unsold => "unsold",
            PlayerStatus::Sold => "sold",
        }
    }
}

/// A player in the auction pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub role: Role,
    /// Minimum price the player can be sold for.
    pub base_price: i64,
    #[serde(default)]
    pub status: PlayerStatus,
    /// Final hammer price. Set together with `sold_to`, never alone.
    pub sold_price: Option<i64>,
    /// ID of the purchasing team.
    pub sold_to: Option<i64>,
    /// Team name snapshot taken at sale time, so results survive a
    /// later team deletion.
    pub sold_team: Option<String>,
    /// Set when the player joined a team through retention rather than
    /// bidding. Distinct from a purchase.
    pub retained_team: Option<i64>,
    /// Object-store path of the player photo, if one was uploaded.
    pub photo_path: Option<String>,
}

/// Insert payload for a new pool entry (CSV import, manual add).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub role: Role,
    pub base_price: i64,
}

impl Player {
    /// Whether the player can be put on the block. Retained players
    /// already belong to a team and never re-enter the draw.
    pub fn is_eligible_for_block(&self) -> bool {
        matches!(self.status, PlayerStatus::Available | PlayerStatus::Unsold)
            && self.retained_team.is_none()
    }

    /// Checks the coupling between `status` and the sale fields:
    /// sold players carry both `sold_price` and `sold_to`; everyone
    /// else carries neither.
    pub fn sale_fields_consistent(&self) -> bool {
        match self.status {
            PlayerStatus::Sold => self.sold_price.is_some() && self.sold_to.is_some(),
            _ => self.sold_price.is_none() && self.sold_to.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_role_storage_forms() {
        assert_eq!(Role::from_str_role("batsman"), Some(Role::Batsman));
        assert_eq!(Role::from_str_role("bowler"), Some(Role::Bowler));
        assert_eq!(Role::from_str_role("allrounder"), Some(Role::Allrounder));
        assert_eq!(Role::from_str_role("wicketkeeper"), Some(Role::Wicketkeeper));
    }

    #[test]
    fn from_str_role_display_forms() {
        assert_eq!(Role::from_str_role("All-Rounder"), Some(Role::Allrounder));
        assert_eq!(Role::from_str_role("All Rounder"), Some(Role::Allrounder));
        assert_eq!(Role::from_str_role("Wicket-Keeper"), Some(Role::Wicketkeeper));
        assert_eq!(Role::from_str_role("Wicket Keeper"), Some(Role::Wicketkeeper));
        assert_eq!(Role::from_str_role("Batsman"), Some(Role::Batsman));
    }

    #[test]
    fn from_str_role_aliases() {
        assert_eq!(Role::from_str_role("batter"), Some(Role::Batsman));
        assert_eq!(Role::from_str_role("keeper"), Some(Role::Wicketkeeper));
        assert_eq!(Role::from_str_role("WK"), Some(Role::Wicketkeeper));
    }

    #[test]
    fn from_str_role_invalid() {
        assert_eq!(Role::from_str_role("umpire"), None);
        assert_eq!(Role::from_str_role(""), None);
    }

    #[test]
    fn role_roundtrip_through_storage_and_display() {
        for role in Role::all() {
            assert_eq!(Role::from_str_role(role.storage_str()), Some(role));
            assert_eq!(Role::from_str_role(role.display_str()), Some(role));
        }
    }

    #[test]
    fn status_roundtrip() {
        for status in [PlayerStatus::Available, PlayerStatus::Unsold, PlayerStatus::Sold] {
            assert_eq!(PlayerStatus::from_str_status(status.storage_str()), Some(status));
        }
        assert_eq!(PlayerStatus::from_str_status("pending"), None);
    }

    #[test]
    fn display_trait_works() {
        assert_eq!(format!("{}", Role::Allrounder), "All-Rounder");
        assert_eq!(format!("{}", Role::Wicketkeeper), "Wicket-Keeper");
    }

    fn sample_player() -> Player {
        Player {
            id: 1,
            name: "R Sharma".to_string(),
            role: Role::Batsman,
            base_price: 1000,
            status: PlayerStatus::Available,
            sold_price: None,
            sold_to: None,
            sold_team: None,
            retained_team: None,
            photo_path: None,
        }
    }

    #[test]
    fn eligibility_follows_status() {
        let mut player = sample_player();
        assert!(player.is_eligible_for_block());
        player.status = PlayerStatus::Unsold;
        assert!(player.is_eligible_for_block());
        player.status = PlayerStatus::Sold;
        assert!(!player.is_eligible_for_block());
    }

    #[test]
    fn retained_players_are_not_eligible() {
        let mut player = sample_player();
        player.retained_team = Some(3);
        assert!(!player.is_eligible_for_block());
    }

    #[test]
    fn sale_fields_consistent_for_sold_player() {
        let mut player = sample_player();
        player.status = PlayerStatus::Sold;
        player.sold_price = Some(4000);
        player.sold_to = Some(2);
        assert!(player.sale_fields_consistent());

        // Losing either half of the pair breaks the coupling.
        player.sold_to = None;
        assert!(!player.sale_fields_consistent());
    }

    #[test]
    fn sale_fields_consistent_for_unsold_player() {
        let mut player = sample_player();
        player.status = PlayerStatus::Unsold;
        assert!(player.sale_fields_consistent());

        // A stale sold_price on an unsold player is a violation.
        player.sold_price = Some(4000);
        assert!(!player.sale_fields_consistent());
    }
}
