//! Data-store seams consumed by the recommendation and behavior services.
//!
//! Each backing store is a trait so services can be exercised against mocks
//! in unit tests and in-memory fakes in integration tests. Production wiring
//! uses the Postgres implementations in [`postgres`].

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Item, ItemSpace, LikeKey, LikeRecord, PreferenceProfile, PriceTier};

pub mod postgres;

pub use postgres::{PgItemCatalog, PgLikeStore, PgPreferenceStore};

#[cfg(test)]
use mockall::automock;

/// Attribute filter for candidate lookup.
///
/// Matching is OR across the four axes: an item qualifies when its tags
/// overlap `tags`, or its category, location, or price tier is a member of
/// the corresponding list. Empty lists match nothing on that axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeFilter {
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub locations: Vec<String>,
    pub price_tiers: Vec<PriceTier>,
}

/// Read/write access to like records across both item spaces.
///
/// Likes have set semantics: adding an existing like is a no-op, as is
/// removing an absent one.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LikeStore: Send + Sync {
    async fn add_like(&self, user_id: i64, key: LikeKey) -> AppResult<()>;

    async fn remove_like(&self, user_id: i64, key: LikeKey) -> AppResult<()>;

    /// All (space, item) pairs liked by one user.
    async fn list_likes(&self, user_id: i64) -> AppResult<Vec<LikeKey>>;

    /// Number of users who liked one item.
    async fn count_likes(&self, key: LikeKey) -> AppResult<i64>;

    /// Like records of users other than `exclude_user` whose key is a member
    /// of `keys`. This is the set-overlap join feeding user similarity.
    async fn find_likes_matching(
        &self,
        keys: &[LikeKey],
        exclude_user: i64,
    ) -> AppResult<Vec<LikeRecord>>;

    /// Item ids liked by the given users within one space, one entry per
    /// like. The caller counts frequency.
    async fn list_item_likes_by_users(
        &self,
        user_ids: &[i64],
        space: ItemSpace,
    ) -> AppResult<Vec<i64>>;
}

/// Read-only access to item records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn get_by_id(&self, space: ItemSpace, id: i64) -> AppResult<Option<Item>>;

    /// Fetches the given items in no particular order; unknown ids are
    /// silently skipped.
    async fn get_many(&self, space: ItemSpace, ids: &[i64]) -> AppResult<Vec<Item>>;

    /// Items flagged trending, ordered by rating descending.
    async fn find_trending(&self, space: ItemSpace, limit: usize) -> AppResult<Vec<Item>>;

    /// Items matching `filter` (OR semantics) and not in `exclude_ids`,
    /// ordered by rating descending.
    async fn find_by_attributes(
        &self,
        space: ItemSpace,
        filter: &AttributeFilter,
        exclude_ids: &[i64],
        limit: usize,
    ) -> AppResult<Vec<Item>>;
}

/// Persistence for per-user preference profiles, one row per user.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn find_by_user(&self, user_id: i64) -> AppResult<Option<PreferenceProfile>>;

    /// Returns the user's profile, creating a default one if absent.
    ///
    /// Creation must be atomic at the storage layer so concurrent first
    /// events for the same user cannot produce duplicate rows.
    async fn find_or_create(&self, user_id: i64) -> AppResult<PreferenceProfile>;

    /// Writes the full profile back (upsert keyed on user id).
    async fn save(&self, profile: &PreferenceProfile) -> AppResult<()>;
}
