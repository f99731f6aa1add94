//! Implicit preference learning from behavioral signals.
//!
//! Every tracking call is find-or-create, apply, save: the profile row is
//! lazily created with defaults on a user's first event, then mutated with
//! the commutative union/ratchet/sticky rules on [`PreferenceProfile`].

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{LikeEvent, LikeKey, PreferenceProfile, SearchEvent, ViewEvent};
use crate::store::{ItemCatalog, LikeStore, PreferenceStore};

pub struct BehaviorService {
    preferences: Arc<dyn PreferenceStore>,
    likes: Arc<dyn LikeStore>,
    catalog: Arc<dyn ItemCatalog>,
}

impl BehaviorService {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        likes: Arc<dyn LikeStore>,
        catalog: Arc<dyn ItemCatalog>,
    ) -> Self {
        Self {
            preferences,
            likes,
            catalog,
        }
    }

    /// Learns from a content view and returns the updated profile.
    pub async fn track_view(&self, user_id: i64, event: ViewEvent) -> AppResult<PreferenceProfile> {
        let mut profile = self.preferences.find_or_create(user_id).await?;
        profile.apply_view(&event);
        self.preferences.save(&profile).await?;
        tracing::debug!(user_id, "view tracked");
        Ok(profile)
    }

    /// Learns from a like action and returns the updated profile.
    pub async fn track_like(&self, user_id: i64, event: LikeEvent) -> AppResult<PreferenceProfile> {
        let mut profile = self.preferences.find_or_create(user_id).await?;
        profile.apply_like(&event);
        self.preferences.save(&profile).await?;
        tracing::debug!(user_id, "like tracked");
        Ok(profile)
    }

    /// Learns from a free-text search and returns the updated profile.
    pub async fn track_search(
        &self,
        user_id: i64,
        event: SearchEvent,
    ) -> AppResult<PreferenceProfile> {
        let mut profile = self.preferences.find_or_create(user_id).await?;
        profile.apply_search(&event);
        self.preferences.save(&profile).await?;
        tracing::debug!(user_id, "search tracked");
        Ok(profile)
    }

    /// The user's current profile, lazily created with defaults if absent.
    pub async fn get_preferences(&self, user_id: i64) -> AppResult<PreferenceProfile> {
        self.preferences.find_or_create(user_id).await
    }

    /// Records a like of an existing item: creates the like record and unions
    /// the item id into the profile's liked-ID set.
    pub async fn record_like(&self, user_id: i64, key: LikeKey) -> AppResult<PreferenceProfile> {
        let item = self
            .catalog
            .get_by_id(key.space, key.item_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("{} {} not found", key.space, key.item_id))
            })?;

        self.likes.add_like(user_id, key).await?;

        let mut profile = self.preferences.find_or_create(user_id).await?;
        profile.liked_ids_mut(key.space).insert(key.item_id);
        self.preferences.save(&profile).await?;

        let total_likes = self.likes.count_likes(key).await?;
        tracing::debug!(
            user_id,
            item_id = key.item_id,
            space = %key.space,
            item_title = %item.title,
            total_likes,
            "like recorded"
        );
        Ok(profile)
    }

    /// Removes a like: destroys the like record and removes the item id from
    /// the profile's liked-ID set. No other profile field is touched.
    ///
    /// Returns `None` when the user has no profile yet.
    pub async fn record_unlike(
        &self,
        user_id: i64,
        key: LikeKey,
    ) -> AppResult<Option<PreferenceProfile>> {
        self.likes.remove_like(user_id, key).await?;

        let Some(mut profile) = self.preferences.find_by_user(user_id).await? else {
            return Ok(None);
        };
        profile.liked_ids_mut(key.space).remove(&key.item_id);
        self.preferences.save(&profile).await?;

        tracing::debug!(user_id, item_id = key.item_id, space = %key.space, "like removed");
        Ok(Some(profile))
    }
}
