// Auction domain: pool players, teams, bid arithmetic, workflow state.

pub mod bid;
pub mod log;
pub mod player;
pub mod state;
pub mod team;

pub use bid::{BidRules, BidStrategy, BidTier};
pub use log::{AuctionLogEntry, LogAction, LogDraft};
pub use player::{NewPlayer, Player, PlayerStatus, Role};
pub use state::{AuctionError, AuctionState, BlockState, CurrentBid};
pub use team::Team;
