// Bid arithmetic: recommended bids, tier increments, step
// normalization, and points formatting.

use serde::{Deserialize, Serialize};

use super::team::Team;

// ---------------------------------------------------------------------------
// Increment tiers
// ---------------------------------------------------------------------------

/// One tier of the bid-increment table. `upto` is the inclusive upper
/// bound of the tier; `None` marks the open-ended top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidTier {
    pub upto: Option<i64>,
    pub step: i64,
}

/// The stock table: fine steps at the bottom of the range, coarse at
/// the top.
pub fn default_tiers() -> Vec<BidTier> {
    vec![
        BidTier { upto: Some(5_000), step: 200 },
        BidTier { upto: Some(10_000), step: 500 },
        BidTier { upto: None, step: 1_000 },
    ]
}

/// Increment step for a bid: the first tier whose bound covers it wins.
/// Falls back to the last tier's step for amounts past every bound.
pub fn bid_increment(tiers: &[BidTier], bid: i64) -> i64 {
    for tier in tiers {
        match tier.upto {
            Some(upto) if bid <= upto => return tier.step,
            None => return tier.step,
            _ => continue,
        }
    }
    tiers.last().map(|t| t.step).unwrap_or(1)
}

/// Round a bid down to the nearest multiple of its tier step.
/// Advisory only: operators may still enter off-step amounts.
pub fn normalize_to_step(tiers: &[BidTier], bid: i64) -> i64 {
    let step = bid_increment(tiers, bid);
    if step <= 0 {
        return bid;
    }
    (bid / step) * step
}

// ---------------------------------------------------------------------------
// Recommended bids
// ---------------------------------------------------------------------------

/// Which formula produces the recommended bid shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BidStrategy {
    /// Spend freely now, reserving only the base minimum bid for each
    /// remaining squad slot.
    #[default]
    FlatReserve,
    /// Divide the remaining budget evenly across remaining slots.
    EvenSplit,
}

/// All bid-validation knobs in one place, derived from config.
#[derive(Debug, Clone)]
pub struct BidRules {
    pub base_min_bid: i64,
    pub tiers: Vec<BidTier>,
    pub strategy: BidStrategy,
    /// When set, `place_bid` rejects amounts above the recommended bid.
    pub enforce_recommended_ceiling: bool,
}

impl Default for BidRules {
    fn default() -> Self {
        BidRules {
            base_min_bid: 1_000,
            tiers: default_tiers(),
            strategy: BidStrategy::FlatReserve,
            enforce_recommended_ceiling: true,
        }
    }
}

/// Highest bid a team can place while still filling its squad.
///
/// `FlatReserve` returns `points_left - (slots - 1) * base_min_bid`,
/// which goes negative once a team has overspent relative to its
/// remaining slots; callers treat a negative value as "cannot safely
/// bid". `EvenSplit` floors the even division of the remaining budget.
/// Both return 0 when the squad is already full.
pub fn recommended_bid(team: &Team, rules: &BidRules) -> i64 {
    let slots = team.balance_players_count as i64;
    if slots == 0 {
        return 0;
    }
    match rules.strategy {
        BidStrategy::FlatReserve => team.points_left - (slots - 1) * rules.base_min_bid,
        BidStrategy::EvenSplit => team.points_left / slots,
    }
}

/// The flat-reserve ceiling snapped onto the tier grid, floored at the
/// base minimum bid. 0 when no slots remain or the budget has dropped
/// below a single minimum bid.
pub fn max_permissible_bid(rules: &BidRules, points_left: i64, slots_remaining: u32) -> i64 {
    if slots_remaining == 0 || points_left < rules.base_min_bid {
        return 0;
    }
    let reserve = points_left - (slots_remaining as i64 - 1) * rules.base_min_bid;
    if reserve <= rules.base_min_bid {
        return rules.base_min_bid;
    }
    normalize_to_step(&rules.tiers, reserve).max(rules.base_min_bid)
}

/// Affordability check against the raw budget, independent of any
/// recommendation.
pub fn can_afford(team: &Team, amount: i64) -> bool {
    team.total_points - team.points_used >= amount
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format a points value with Indian digit grouping: the last three
/// digits form one group, every group above that has two digits
/// (1234567 -> "12,34,567").
pub fn format_points(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
