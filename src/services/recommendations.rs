//! Candidate scoring for the three recommendation strategies.
//!
//! All strategies share the same contract: deduplicated discovery items the
//! user has not already liked, ordered by rating descending, truncated to the
//! requested limit. A user with no signal never gets an empty "no data"
//! response; every strategy degrades to the trending fallback instead.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{Item, ItemSpace};
use crate::services::{effective_limit, ranking::RankedTally, SimilarityFinder};
use crate::store::{AttributeFilter, ItemCatalog, LikeStore};

/// Candidate-user pool handed to the similarity finder, regardless of the
/// final result limit. Wider than any sensible limit so the frequency
/// ranking has enough raw material.
const SIMILAR_USER_POOL: i64 = 20;

/// How many top tags feed the personalized signature.
const PERSONALIZED_TOP_TAGS: usize = 5;
/// How many top categories and locations feed the personalized signature.
const PERSONALIZED_TOP_GROUPS: usize = 3;

pub struct RecommendationService {
    likes: Arc<dyn LikeStore>,
    catalog: Arc<dyn ItemCatalog>,
    similarity: SimilarityFinder,
}

impl RecommendationService {
    pub fn new(likes: Arc<dyn LikeStore>, catalog: Arc<dyn ItemCatalog>) -> Self {
        let similarity = SimilarityFinder::new(Arc::clone(&likes));
        Self {
            likes,
            catalog,
            similarity,
        }
    }

    pub fn similarity(&self) -> &SimilarityFinder {
        &self.similarity
    }

    /// Collaborative filtering: items liked most often by users with
    /// overlapping like history.
    ///
    /// Frequency among similar users selects the candidates; the output is
    /// then re-ranked by rating.
    pub async fn collaborative(&self, user_id: i64, limit: Option<i64>) -> AppResult<Vec<Item>> {
        let limit = effective_limit(limit);

        let similar_users = self
            .similarity
            .find_similar_users(user_id, Some(SIMILAR_USER_POOL))
            .await?;
        if similar_users.is_empty() {
            return self.trending_fallback(user_id, limit).await;
        }

        let already_liked: HashSet<i64> =
            self.liked_discovery_ids(user_id).await?.into_iter().collect();

        let mut like_counts = RankedTally::new();
        for item_id in self
            .likes
            .list_item_likes_by_users(&similar_users, ItemSpace::Discovery)
            .await?
        {
            like_counts.add(item_id);
        }

        // Over-fetch before exclusion so filtering out the user's own likes
        // still leaves a full page of candidates.
        let candidate_ids: Vec<i64> = like_counts
            .top(limit * 2)
            .into_iter()
            .filter(|id| !already_liked.contains(id))
            .take(limit)
            .collect();

        let mut items = self
            .catalog
            .get_many(ItemSpace::Discovery, &candidate_ids)
            .await?;
        sort_by_rating(&mut items);

        tracing::debug!(
            user_id,
            similar_count = similar_users.len(),
            result_count = items.len(),
            "collaborative recommendations computed"
        );
        Ok(items)
    }

    /// Content similarity: the union of tags, categories, locations, and
    /// price tiers across the user's liked discoveries, matched against the
    /// catalog on any single axis.
    pub async fn discovery_based(&self, user_id: i64, limit: Option<i64>) -> AppResult<Vec<Item>> {
        let limit = effective_limit(limit);

        let liked_ids = self.liked_discovery_ids(user_id).await?;
        if liked_ids.is_empty() {
            return self.trending_fallback(user_id, limit).await;
        }
        let liked_items = self.catalog.get_many(ItemSpace::Discovery, &liked_ids).await?;

        let mut tags = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut price_tiers = BTreeSet::new();
        for item in &liked_items {
            tags.extend(item.tags.iter().cloned());
            categories.insert(item.category.clone());
            locations.insert(item.location.clone());
            price_tiers.insert(item.price);
        }

        let filter = AttributeFilter {
            tags: tags.into_iter().collect(),
            categories: categories.into_iter().collect(),
            locations: locations.into_iter().collect(),
            price_tiers: price_tiers.into_iter().collect(),
        };

        let items = self
            .catalog
            .find_by_attributes(ItemSpace::Discovery, &filter, &liked_ids, limit)
            .await?;

        tracing::debug!(
            user_id,
            liked_count = liked_ids.len(),
            result_count = items.len(),
            "discovery-based recommendations computed"
        );
        Ok(items)
    }

    /// Weighted content similarity: each liked discovery contributes its
    /// normalized rating (rating / 5) to per-tag, per-category, per-location,
    /// and per-price-tier scores; the top-scored keys form the signature.
    pub async fn personalized(&self, user_id: i64, limit: Option<i64>) -> AppResult<Vec<Item>> {
        let limit = effective_limit(limit);

        let liked_ids = self.liked_discovery_ids(user_id).await?;
        if liked_ids.is_empty() {
            return self.trending_fallback(user_id, limit).await;
        }
        let liked_items = self.catalog.get_many(ItemSpace::Discovery, &liked_ids).await?;

        let mut tag_scores = RankedTally::new();
        let mut category_scores = RankedTally::new();
        let mut location_scores = RankedTally::new();
        let mut price_scores = RankedTally::new();
        for item in &liked_items {
            let weight = item.rating / 5.0;
            for tag in &item.tags {
                tag_scores.add_weighted(tag.clone(), weight);
            }
            category_scores.add_weighted(item.category.clone(), weight);
            location_scores.add_weighted(item.location.clone(), weight);
            price_scores.add_weighted(item.price, weight);
        }

        // Price tier preference is scored but deliberately not used to select
        // candidates; only tags, categories, and locations filter the catalog.
        let top_price_tiers = price_scores.top(PERSONALIZED_TOP_GROUPS);
        tracing::debug!(
            user_id,
            ?top_price_tiers,
            "price-tier preference tracked but excluded from selection"
        );

        let filter = AttributeFilter {
            tags: tag_scores.top(PERSONALIZED_TOP_TAGS),
            categories: category_scores.top(PERSONALIZED_TOP_GROUPS),
            locations: location_scores.top(PERSONALIZED_TOP_GROUPS),
            price_tiers: Vec::new(),
        };

        let items = self
            .catalog
            .find_by_attributes(ItemSpace::Discovery, &filter, &liked_ids, limit)
            .await?;

        tracing::debug!(
            user_id,
            liked_count = liked_ids.len(),
            result_count = items.len(),
            "personalized discoveries computed"
        );
        Ok(items)
    }

    /// Degraded-but-always-available result for users with no signal: the
    /// top-rated trending items. First-class behavior, not an error path.
    async fn trending_fallback(&self, user_id: i64, limit: usize) -> AppResult<Vec<Item>> {
        tracing::debug!(user_id, limit, "no personalization signal, using trending fallback");
        self.catalog.find_trending(ItemSpace::Discovery, limit).await
    }

    async fn liked_discovery_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        Ok(self
            .likes
            .list_likes(user_id)
            .await?
            .into_iter()
            .filter(|key| key.space == ItemSpace::Discovery)
            .map(|key| key.item_id)
            .collect())
    }
}

fn sort_by_rating(items: &mut [Item]) {
    items.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}
