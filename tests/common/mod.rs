//! In-memory store implementations and server setup shared by the HTTP
//! integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::Utc;

use wayfarer_api::api::{create_router, AppState, USER_ID_HEADER};
use wayfarer_api::error::AppResult;
use wayfarer_api::models::{
    Item, ItemSpace, LikeKey, LikeRecord, PreferenceProfile, PriceTier,
};
use wayfarer_api::store::{AttributeFilter, ItemCatalog, LikeStore, PreferenceStore};

#[derive(Default)]
pub struct InMemoryLikeStore {
    likes: Mutex<Vec<LikeRecord>>,
}

#[async_trait]
impl LikeStore for InMemoryLikeStore {
    async fn add_like(&self, user_id: i64, key: LikeKey) -> AppResult<()> {
        let mut likes = self.likes.lock().unwrap();
        if !likes.iter().any(|l| l.user_id == user_id && l.key == key) {
            likes.push(LikeRecord {
                user_id,
                key,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn remove_like(&self, user_id: i64, key: LikeKey) -> AppResult<()> {
        self.likes
            .lock()
            .unwrap()
            .retain(|l| !(l.user_id == user_id && l.key == key));
        Ok(())
    }

    async fn list_likes(&self, user_id: i64) -> AppResult<Vec<LikeKey>> {
        Ok(self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.key)
            .collect())
    }

    async fn count_likes(&self, key: LikeKey) -> AppResult<i64> {
        Ok(self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.key == key)
            .count() as i64)
    }

    async fn find_likes_matching(
        &self,
        keys: &[LikeKey],
        exclude_user: i64,
    ) -> AppResult<Vec<LikeRecord>> {
        Ok(self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id != exclude_user && keys.contains(&l.key))
            .cloned()
            .collect())
    }

    async fn list_item_likes_by_users(
        &self,
        user_ids: &[i64],
        space: ItemSpace,
    ) -> AppResult<Vec<i64>> {
        Ok(self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.key.space == space && user_ids.contains(&l.user_id))
            .map(|l| l.key.item_id)
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    items: Mutex<HashMap<(ItemSpace, i64), Item>>,
}

impl InMemoryCatalog {
    pub fn insert(&self, space: ItemSpace, item: Item) {
        self.items.lock().unwrap().insert((space, item.id), item);
    }
}

fn matches(item: &Item, filter: &AttributeFilter) -> bool {
    item.tags.iter().any(|tag| filter.tags.contains(tag))
        || filter.categories.contains(&item.category)
        || filter.locations.contains(&item.location)
        || filter.price_tiers.contains(&item.price)
}

fn by_rating_desc(items: &mut [Item]) {
    items.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

#[async_trait]
impl ItemCatalog for InMemoryCatalog {
    async fn get_by_id(&self, space: ItemSpace, id: i64) -> AppResult<Option<Item>> {
        Ok(self.items.lock().unwrap().get(&(space, id)).cloned())
    }

    async fn get_many(&self, space: ItemSpace, ids: &[i64]) -> AppResult<Vec<Item>> {
        let items = self.items.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| items.get(&(space, *id)).cloned())
            .collect())
    }

    async fn find_trending(&self, space: ItemSpace, limit: usize) -> AppResult<Vec<Item>> {
        let mut trending: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|((s, _), item)| *s == space && item.trending)
            .map(|(_, item)| item.clone())
            .collect();
        by_rating_desc(&mut trending);
        trending.truncate(limit);
        Ok(trending)
    }

    async fn find_by_attributes(
        &self,
        space: ItemSpace,
        filter: &AttributeFilter,
        exclude_ids: &[i64],
        limit: usize,
    ) -> AppResult<Vec<Item>> {
        let mut found: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|((s, id), item)| {
                *s == space && !exclude_ids.contains(id) && matches(item, filter)
            })
            .map(|(_, item)| item.clone())
            .collect();
        by_rating_desc(&mut found);
        found.truncate(limit);
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    profiles: Mutex<HashMap<i64, PreferenceProfile>>,
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn find_by_user(&self, user_id: i64) -> AppResult<Option<PreferenceProfile>> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn find_or_create(&self, user_id: i64) -> AppResult<PreferenceProfile> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert_with(|| PreferenceProfile::new(user_id))
            .clone())
    }

    async fn save(&self, profile: &PreferenceProfile) -> AppResult<()> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub server: TestServer,
    pub likes: Arc<InMemoryLikeStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub preferences: Arc<InMemoryPreferenceStore>,
}

pub fn test_context() -> TestContext {
    let likes = Arc::new(InMemoryLikeStore::default());
    let catalog = Arc::new(InMemoryCatalog::default());
    let preferences = Arc::new(InMemoryPreferenceStore::default());

    let state = AppState::new(likes.clone(), catalog.clone(), preferences.clone());
    let server = TestServer::new(create_router(state)).unwrap();

    TestContext {
        server,
        likes,
        catalog,
        preferences,
    }
}

pub fn user_header(user_id: i64) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(USER_ID_HEADER),
        HeaderValue::from_str(&user_id.to_string()).unwrap(),
    )
}

pub fn get_as(server: &TestServer, user_id: i64, path: &str) -> TestRequest {
    let (name, value) = user_header(user_id);
    server.get(path).add_header(name, value)
}

pub fn post_as(server: &TestServer, user_id: i64, path: &str) -> TestRequest {
    let (name, value) = user_header(user_id);
    server.post(path).add_header(name, value)
}

/// A discovery item with neutral attributes; tests override fields as needed.
pub fn item(id: i64, rating: f64, trending: bool) -> Item {
    Item {
        id,
        title: format!("Item {}", id),
        description: String::new(),
        tags: Vec::new(),
        category: "nature".into(),
        location: "Azores".into(),
        price: PriceTier::Moderate,
        rating,
        trending,
    }
}
