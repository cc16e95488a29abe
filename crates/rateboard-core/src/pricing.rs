//! Sponsored-content price model.
//!
//! Prices are a base fee plus a per-follower rate. The rate and base depend
//! on which follower tier the account falls into. Rates are stored as "one
//! currency unit per N followers" so the whole computation stays in integer
//! arithmetic and rounds exactly.

use serde::{Deserialize, Serialize};

/// Follower count at which the premium tier starts (inclusive).
pub const TIER_THRESHOLD: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Below [`TIER_THRESHOLD`] followers.
    Standard,
    /// [`TIER_THRESHOLD`] followers and above.
    Premium,
}

struct TierRates {
    post_base: u64,
    /// Followers per currency unit added to the post price.
    post_divisor: u64,
    story_base: u64,
    /// Followers per currency unit added to the story price.
    story_divisor: u64,
}

// 0.05 / 1000 per follower = 1 unit per 20,000 followers, and so on.
const STANDARD_RATES: TierRates = TierRates {
    post_base: 1_000,
    post_divisor: 20_000,
    story_base: 500,
    story_divisor: 40_000,
};

const PREMIUM_RATES: TierRates = TierRates {
    post_base: 10_000,
    post_divisor: 50_000,
    story_base: 5_000,
    story_divisor: 100_000,
};

impl Tier {
    #[must_use]
    pub fn for_followers(followers: u64) -> Self {
        if followers >= TIER_THRESHOLD {
            Tier::Premium
        } else {
            Tier::Standard
        }
    }

    fn rates(self) -> &'static TierRates {
        match self {
            Tier::Standard => &STANDARD_RATES,
            Tier::Premium => &PREMIUM_RATES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub post_price: u64,
    pub story_price: u64,
}

/// Estimates post and story prices for an account with `followers` followers.
///
/// The two tiers meet discontinuously at [`TIER_THRESHOLD`]: 999,999
/// followers prices at 1050/525 while 1,000,000 prices at 10020/5010.
#[must_use]
pub fn estimate_prices(followers: u64) -> PriceEstimate {
    let rates = Tier::for_followers(followers).rates();
    PriceEstimate {
        post_price: rates
            .post_base
            .saturating_add(div_round_half_up(followers, rates.post_divisor)),
        story_price: rates
            .story_base
            .saturating_add(div_round_half_up(followers, rates.story_divisor)),
    }
}

fn div_round_half_up(value: u64, divisor: u64) -> u64 {
    let rounded = (u128::from(value) + u128::from(divisor / 2)) / u128::from(divisor);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}
