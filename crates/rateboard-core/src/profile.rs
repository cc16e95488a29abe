use serde::{Deserialize, Serialize};

use crate::counts::parse_count;
use crate::pricing::{estimate_prices, PriceEstimate};

/// Point-in-time read of a public profile's headline metrics.
///
/// Raw display strings are kept for rendering; the parsed counts are derived
/// once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub avatar: Option<String>,
    pub username: String,
    pub bio: String,
    pub posts: String,
    pub followers: String,
    pub following: String,
    pub verified: bool,
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
}

impl ProfileSnapshot {
    #[must_use]
    pub fn new(
        avatar: Option<String>,
        username: String,
        bio: String,
        posts: String,
        followers: String,
        following: String,
        verified: bool,
    ) -> Self {
        Self {
            posts_count: parse_count(&posts),
            followers_count: parse_count(&followers),
            following_count: parse_count(&following),
            avatar,
            username,
            bio,
            posts,
            followers,
            following,
            verified,
        }
    }

    #[must_use]
    pub fn price_estimate(&self) -> PriceEstimate {
        estimate_prices(self.followers_count)
    }
}

/// Canonical form of a user-supplied handle: trimmed, lowercased, one
/// leading `@` dropped. `None` when nothing is left.
#[must_use]
pub fn normalize_username(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let name = lowered.strip_prefix('@').unwrap_or(&lowered).trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Wire shape returned by the estimator: the snapshot's display strings
/// plus the derived follower count and prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEstimate {
    pub avatar: Option<String>,
    pub username: String,
    pub bio: String,
    pub posts: String,
    pub followers: String,
    pub following: String,
    pub verified: bool,
    pub followers_count: u64,
    pub post_price: u64,
    pub story_price: u64,
}

impl From<ProfileSnapshot> for ProfileEstimate {
    fn from(snapshot: ProfileSnapshot) -> Self {
        let PriceEstimate {
            post_price,
            story_price,
        } = snapshot.price_estimate();
        Self {
            avatar: snapshot.avatar,
            username: snapshot.username,
            bio: snapshot.bio,
            posts: snapshot.posts,
            followers: snapshot.followers,
            following: snapshot.following,
            verified: snapshot.verified,
            followers_count: snapshot.followers_count,
            post_price,
            story_price,
        }
    }
}
