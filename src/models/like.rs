use chrono::{DateTime, Utc};

use super::ItemSpace;

/// An (item space, item id) pair identifying one likeable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LikeKey {
    pub space: ItemSpace,
    pub item_id: i64,
}

impl LikeKey {
    pub fn discovery(item_id: i64) -> Self {
        Self {
            space: ItemSpace::Discovery,
            item_id,
        }
    }

    pub fn recommendation(item_id: i64) -> Self {
        Self {
            space: ItemSpace::Recommendation,
            item_id,
        }
    }
}

/// One user's like of one item.
///
/// Likes are a set, not a multiset: at most one record exists per
/// (user, space, item). Created on like, destroyed on unlike, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeRecord {
    pub user_id: i64,
    pub key: LikeKey,
    pub created_at: DateTime<Utc>,
}
