use std::sync::Arc;

use crate::error::AppResult;
use crate::services::{effective_limit, ranking::RankedTally};
use crate::store::LikeStore;

/// Finds users whose like history overlaps a target user's.
pub struct SimilarityFinder {
    likes: Arc<dyn LikeStore>,
}

impl SimilarityFinder {
    pub fn new(likes: Arc<dyn LikeStore>) -> Self {
        Self { likes }
    }

    /// Users who share liked items with `user_id`, ranked by overlap count
    /// descending, ties broken by user id ascending.
    ///
    /// A user with no likes has no basis for similarity and yields an empty
    /// list; that is not an error. Non-positive limits fall back to the
    /// default.
    pub async fn find_similar_users(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> AppResult<Vec<i64>> {
        let limit = effective_limit(limit);

        let liked = self.likes.list_likes(user_id).await?;
        if liked.is_empty() {
            tracing::debug!(user_id, "user has no likes, skipping similarity search");
            return Ok(Vec::new());
        }

        let overlapping = self.likes.find_likes_matching(&liked, user_id).await?;

        let mut overlap_counts = RankedTally::new();
        for like in overlapping {
            overlap_counts.add(like.user_id);
        }

        let similar = overlap_counts.top(limit);
        tracing::debug!(
            user_id,
            liked_count = liked.len(),
            similar_count = similar.len(),
            "similar users computed"
        );
        Ok(similar)
    }
}
