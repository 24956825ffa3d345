// Auction workflow state and pure settlement rules.
//
// Everything here is side-effect free: validators and settlement
// functions take snapshots of players and teams and return either an
// error or a patch describing the writes to perform. The orchestrator
// in `app` applies the patches through the database.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::bid::{can_afford, recommended_bid, BidRules};
use super::log::{LogAction, LogDraft};
use super::player::{Player, PlayerStatus};
use super::team::Team;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Validation failures surfaced to the operator. These are pre-flight
/// checks: none of them leaves partial state behind.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuctionError {
    #[error("auction is locked")]
    Locked,
    #[error("no player is on the block")]
    NoPlayerOnBlock,
    #[error("another player is already on the block")]
    BlockOccupied,
    #[error("player '{name}' is on the block; settle the sale first")]
    PlayerOnBlock { name: String },
    #[error("no bid to finalize")]
    NoBidToFinalize,
    #[error("player '{name}' is already sold")]
    AlreadySold { name: String },
    #[error("bid {bid} is below the base price {base_price}")]
    BelowBasePrice { bid: i64, base_price: i64 },
    #[error("bid {bid} exceeds the recommended maximum {recommended}")]
    AboveRecommended { bid: i64, recommended: i64 },
    #[error("{team} cannot afford {bid} with {available} points available")]
    InsufficientPoints { team: String, bid: i64, available: i64 },
    #[error("{team} already has a full squad of {max_players}")]
    SquadFull { team: String, max_players: u32 },
    #[error("{team} has used all {max_retain} retention slots")]
    RetentionSlotsFull { team: String, max_retain: u32 },
    #[error("team name '{0}' is already taken")]
    DuplicateTeamName(String),
    #[error("unknown team id {0}")]
    UnknownTeam(i64),
    #[error("unknown player id {0}")]
    UnknownPlayer(i64),
}

// ---------------------------------------------------------------------------
// Block state
// ---------------------------------------------------------------------------

/// Where the block currently stands. `Selecting` is a purely cosmetic
/// phase: the actual pick is drawn up front and revealed when the
/// animation finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockState {
    Idle,
    Selecting { pending_player_id: i64 },
    OnBlock { player_id: i64 },
}

/// The standing high bid for the player on the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentBid {
    pub team_id: i64,
    pub amount: i64,
}

/// Process-local workflow state. Lost on restart by design; the
/// database holds only settled sales.
#[derive(Debug, Clone)]
pub struct AuctionState {
    pub block: BlockState,
    pub current_bid: Option<CurrentBid>,
    pub locked: bool,
}

impl AuctionState {
    pub fn new(locked: bool) -> Self {
        AuctionState { block: BlockState::Idle, current_bid: None, locked }
    }

    /// The player on the block, if the reveal has happened.
    pub fn player_on_block(&self) -> Option<i64> {
        match self.block {
            BlockState::OnBlock { player_id } => Some(player_id),
            _ => None,
        }
    }

    /// Whether this player is on the block, revealed or still pending
    /// the selection animation.
    pub fn involves_player(&self, player_id: i64) -> bool {
        match self.block {
            BlockState::Selecting { pending_player_id } => pending_player_id == player_id,
            BlockState::OnBlock { player_id: on_block } => on_block == player_id,
            BlockState::Idle => false,
        }
    }

    /// Return to idle, dropping any standing bid.
    pub fn clear_block(&mut self) {
        self.block = BlockState::Idle;
        self.current_bid = None;
    }
}

// ---------------------------------------------------------------------------
// Random selection
// ---------------------------------------------------------------------------

/// Draw the next player for the block: a uniform pick over `available`
/// players, falling back to `unsold` once the fresh pool is empty.
/// Returns None when no eligible players remain (non-fatal).
pub fn pick_random_player<'a, R: Rng>(players: &'a [Player], rng: &mut R) -> Option<&'a Player> {
    let available: Vec<&Player> = players
        .iter()
        .filter(|p| p.is_eligible_for_block() && p.status == PlayerStatus::Available)
        .collect();
    let pool: Vec<&Player> = if available.is_empty() {
        players
            .iter()
            .filter(|p| p.is_eligible_for_block() && p.status == PlayerStatus::Unsold)
            .collect()
    } else {
        available
    };
    pool.choose(rng).copied()
}

// ---------------------------------------------------------------------------
// Bid validation
// ---------------------------------------------------------------------------

/// Pre-flight checks for a bid. Passing here means the only remaining
/// failure mode is the log write itself.
pub fn validate_bid(
    state: &AuctionState,
    player: &Player,
    team: &Team,
    amount: i64,
    rules: &BidRules,
) -> Result<(), AuctionError> {
    if state.locked {
        return Err(AuctionError::Locked);
    }
    if state.player_on_block() != Some(player.id) {
        return Err(AuctionError::NoPlayerOnBlock);
    }
    if amount < player.base_price {
        return Err(AuctionError::BelowBasePrice { bid: amount, base_price: player.base_price });
    }
    if rules.enforce_recommended_ceiling {
        let recommended = recommended_bid(team, rules);
        if amount > recommended {
            return Err(AuctionError::AboveRecommended { bid: amount, recommended });
        }
    }
    if !can_afford(team, amount) {
        return Err(AuctionError::InsufficientPoints {
            team: team.team_name.clone(),
            bid: amount,
            available: team.total_points - team.points_used,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Settlement reducers
// ---------------------------------------------------------------------------

/// The player-side write of a completed sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SalePatch {
    pub player_id: i64,
    pub sold_price: i64,
    pub sold_to: i64,
    pub sold_team: String,
}

/// Everything finalize-sale must persist, in order: the player patch,
/// the post-purchase team snapshot, then the `sold` log row.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    pub patch: SalePatch,
    pub team_after: Team,
    pub log: LogDraft,
}

/// Compute the effects of hammering the current bid down. Checks the
/// squad ceiling; budget was already validated when the bid was
/// placed, but is re-checked here since counters may have moved.
pub fn settle_sale(player: &Player, team: &Team, bid: CurrentBid) -> Result<SaleOutcome, AuctionError> {
    if player.status == PlayerStatus::Sold {
        return Err(AuctionError::AlreadySold { name: player.name.clone() });
    }
    if !team.has_squad_slot() {
        return Err(AuctionError::SquadFull {
            team: team.team_name.clone(),
            max_players: team.max_players,
        });
    }
    if !can_afford(team, bid.amount) {
        return Err(AuctionError::InsufficientPoints {
            team: team.team_name.clone(),
            bid: bid.amount,
            available: team.total_points - team.points_used,
        });
    }
    let mut team_after = team.clone();
    team_after.apply_purchase(bid.amount);
    Ok(SaleOutcome {
        patch: SalePatch {
            player_id: player.id,
            sold_price: bid.amount,
            sold_to: team.id,
            sold_team: team.team_name.clone(),
        },
        team_after,
        log: LogDraft {
            player_id: player.id,
            player_name: player.name.clone(),
            team_id: team.id,
            team_name: team.team_name.clone(),
            bid_amount: bid.amount,
            action: LogAction::Sold,
        },
    })
}

/// Everything a retention must persist. `release_team_after` is the
/// previous retaining team with its counters reversed, present only on
/// re-assignment.
#[derive(Debug, Clone)]
pub struct RetentionOutcome {
    pub player_id: i64,
    pub price: i64,
    pub retained_by: i64,
    pub team_after: Team,
    pub release_team_after: Option<Team>,
}

/// Assign a player to a team at base price, bypassing bidding.
/// `previous_team` is the team currently holding the retention, if the
/// player was already retained elsewhere; its counters are reversed as
/// part of the same settlement.
pub fn settle_retention(
    player: &Player,
    team: &Team,
    previous_team: Option<&Team>,
) -> Result<RetentionOutcome, AuctionError> {
    if player.status == PlayerStatus::Sold {
        return Err(AuctionError::AlreadySold { name: player.name.clone() });
    }
    if !team.has_retention_slot() {
        return Err(AuctionError::RetentionSlotsFull {
            team: team.team_name.clone(),
            max_retain: team.max_retain_players,
        });
    }
    if !team.has_squad_slot() {
        return Err(AuctionError::SquadFull {
            team: team.team_name.clone(),
            max_players: team.max_players,
        });
    }
    if !can_afford(team, player.base_price) {
        return Err(AuctionError::InsufficientPoints {
            team: team.team_name.clone(),
            bid: player.base_price,
            available: team.total_points - team.points_used,
        });
    }
    let release_team_after = previous_team.filter(|prev| prev.id != team.id).map(|prev| {
        let mut reversed = prev.clone();
        reversed.revert_purchase(player.base_price);
        reversed.retained_players_count = reversed.retained_players_count.saturating_sub(1);
        reversed
    });
    let mut team_after = team.clone();
    team_after.apply_purchase(player.base_price);
    team_after.retained_players_count += 1;
    Ok(RetentionOutcome {
        player_id: player.id,
        price: player.base_price,
        retained_by: team.id,
        team_after,
        release_team_after,
    })
}
