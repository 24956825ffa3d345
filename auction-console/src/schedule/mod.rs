// Tournament scheduling: round-robin fixtures and the group lottery.

pub mod lottery;
pub mod round_robin;

pub use lottery::{Group, GroupDraw, LotteryError};
pub use round_robin::{generate_round_robin, shuffle_schedule, Fixture};
