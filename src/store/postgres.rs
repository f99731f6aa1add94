//! Postgres implementations of the store traits.
//!
//! Queries are built at runtime against the schema in `migrations/`, with
//! `FromRow` row structs converted into domain models at the boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AttributeFilter, ItemCatalog, LikeStore, PreferenceStore};
use crate::error::{AppError, AppResult};
use crate::models::{Item, ItemSpace, LikeKey, LikeRecord, PreferenceProfile};

const ITEM_COLUMNS: &str = "id, title, description, tags, category, location, price, rating, trending";

fn item_table(space: ItemSpace) -> &'static str {
    match space {
        ItemSpace::Discovery => "discoveries",
        ItemSpace::Recommendation => "recommendations",
    }
}

/// Splits mixed-space like keys into per-space id lists for array binding.
fn split_by_space(keys: &[LikeKey]) -> (Vec<i64>, Vec<i64>) {
    let mut discovery_ids = Vec::new();
    let mut recommendation_ids = Vec::new();
    for key in keys {
        match key.space {
            ItemSpace::Discovery => discovery_ids.push(key.item_id),
            ItemSpace::Recommendation => recommendation_ids.push(key.item_id),
        }
    }
    (discovery_ids, recommendation_ids)
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    user_id: i64,
    space: String,
    item_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<LikeRow> for LikeRecord {
    type Error = AppError;

    fn try_from(row: LikeRow) -> Result<Self, Self::Error> {
        let space = row.space.parse::<ItemSpace>().map_err(AppError::Internal)?;
        Ok(LikeRecord {
            user_id: row.user_id,
            key: LikeKey {
                space,
                item_id: row.item_id,
            },
            created_at: row.created_at,
        })
    }
}

pub struct PgLikeStore {
    pool: PgPool,
}

impl PgLikeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn add_like(&self, user_id: i64, key: LikeKey) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO likes (user_id, space, item_id) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, space, item_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(key.space.as_str())
        .bind(key.item_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_like(&self, user_id: i64, key: LikeKey) -> AppResult<()> {
        sqlx::query("DELETE FROM likes WHERE user_id = $1 AND space = $2 AND item_id = $3")
            .bind(user_id)
            .bind(key.space.as_str())
            .bind(key.item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_likes(&self, user_id: i64) -> AppResult<Vec<LikeKey>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT space, item_id FROM likes WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(space, item_id)| {
                let space = space.parse::<ItemSpace>().map_err(AppError::Internal)?;
                Ok(LikeKey { space, item_id })
            })
            .collect()
    }

    async fn count_likes(&self, key: LikeKey) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE space = $1 AND item_id = $2")
                .bind(key.space.as_str())
                .bind(key.item_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn find_likes_matching(
        &self,
        keys: &[LikeKey],
        exclude_user: i64,
    ) -> AppResult<Vec<LikeRecord>> {
        let (discovery_ids, recommendation_ids) = split_by_space(keys);

        let rows: Vec<LikeRow> = sqlx::query_as(
            "SELECT user_id, space, item_id, created_at FROM likes \
             WHERE user_id <> $1 \
               AND ((space = 'discovery' AND item_id = ANY($2)) \
                 OR (space = 'recommendation' AND item_id = ANY($3)))",
        )
        .bind(exclude_user)
        .bind(&discovery_ids)
        .bind(&recommendation_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LikeRecord::try_from).collect()
    }

    async fn list_item_likes_by_users(
        &self,
        user_ids: &[i64],
        space: ItemSpace,
    ) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT item_id FROM likes WHERE user_id = ANY($1) AND space = $2",
        )
        .bind(user_ids)
        .bind(space.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    title: String,
    description: String,
    tags: Vec<String>,
    category: String,
    location: String,
    price: String,
    rating: f64,
    trending: bool,
}

impl TryFrom<ItemRow> for Item {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let price = row.price.parse().map_err(AppError::Internal)?;
        Ok(Item {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            category: row.category,
            location: row.location,
            price,
            rating: row.rating,
            trending: row.trending,
        })
    }
}

pub struct PgItemCatalog {
    pool: PgPool,
}

impl PgItemCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemCatalog for PgItemCatalog {
    async fn get_by_id(&self, space: ItemSpace, id: i64) -> AppResult<Option<Item>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            ITEM_COLUMNS,
            item_table(space)
        );
        let row: Option<ItemRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(Item::try_from).transpose()
    }

    async fn get_many(&self, space: ItemSpace, ids: &[i64]) -> AppResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ANY($1)",
            ITEM_COLUMNS,
            item_table(space)
        );
        let rows: Vec<ItemRow> = sqlx::query_as(&sql).bind(ids).fetch_all(&self.pool).await?;
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn find_trending(&self, space: ItemSpace, limit: usize) -> AppResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE trending ORDER BY rating DESC LIMIT $1",
            ITEM_COLUMNS,
            item_table(space)
        );
        let rows: Vec<ItemRow> = sqlx::query_as(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn find_by_attributes(
        &self,
        space: ItemSpace,
        filter: &AttributeFilter,
        exclude_ids: &[i64],
        limit: usize,
    ) -> AppResult<Vec<Item>> {
        let price_tiers: Vec<String> = filter
            .price_tiers
            .iter()
            .map(|tier| tier.as_str().to_string())
            .collect();

        let sql = format!(
            "SELECT {} FROM {} \
             WHERE NOT (id = ANY($1)) \
               AND (tags && $2 \
                 OR category = ANY($3) \
                 OR location = ANY($4) \
                 OR price = ANY($5)) \
             ORDER BY rating DESC \
             LIMIT $6",
            ITEM_COLUMNS,
            item_table(space)
        );

        let rows: Vec<ItemRow> = sqlx::query_as(&sql)
            .bind(exclude_ids)
            .bind(&filter.tags)
            .bind(&filter.categories)
            .bind(&filter.locations)
            .bind(&price_tiers)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Item::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct PreferenceRow {
    user_id: i64,
    preferred_categories: Vec<String>,
    preferred_locations: Vec<String>,
    preferred_budget: Option<String>,
    min_rating: f64,
    preferred_time_of_day: Option<String>,
    instagrammable: bool,
    trending: bool,
    exclusive: bool,
    liked_discovery_ids: Vec<i64>,
    liked_recommendation_ids: Vec<i64>,
}

impl TryFrom<PreferenceRow> for PreferenceProfile {
    type Error = AppError;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        let preferred_budget = row
            .preferred_budget
            .map(|s| s.parse().map_err(AppError::Internal))
            .transpose()?;
        let preferred_time_of_day = row
            .preferred_time_of_day
            .map(|s| s.parse().map_err(AppError::Internal))
            .transpose()?;

        Ok(PreferenceProfile {
            user_id: row.user_id,
            preferred_categories: row.preferred_categories.into_iter().collect(),
            preferred_locations: row.preferred_locations.into_iter().collect(),
            preferred_budget,
            min_rating: row.min_rating,
            preferred_time_of_day,
            instagrammable: row.instagrammable,
            trending: row.trending,
            exclusive: row.exclusive,
            liked_discovery_ids: row.liked_discovery_ids.into_iter().collect(),
            liked_recommendation_ids: row.liked_recommendation_ids.into_iter().collect(),
        })
    }
}

const PREFERENCE_COLUMNS: &str = "user_id, preferred_categories, preferred_locations, \
     preferred_budget, min_rating, preferred_time_of_day, instagrammable, trending, \
     exclusive, liked_discovery_ids, liked_recommendation_ids";

pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn find_by_user(&self, user_id: i64) -> AppResult<Option<PreferenceProfile>> {
        let sql = format!(
            "SELECT {} FROM user_preferences WHERE user_id = $1",
            PREFERENCE_COLUMNS
        );
        let row: Option<PreferenceRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(PreferenceProfile::try_from).transpose()
    }

    async fn find_or_create(&self, user_id: i64) -> AppResult<PreferenceProfile> {
        // ON CONFLICT DO NOTHING makes lazy creation atomic: two concurrent
        // first events for the same user cannot create duplicate rows.
        sqlx::query(
            "INSERT INTO user_preferences (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.find_by_user(user_id).await?.ok_or_else(|| {
            AppError::Internal(format!("preference profile missing for user {}", user_id))
        })
    }

    async fn save(&self, profile: &PreferenceProfile) -> AppResult<()> {
        let categories: Vec<String> = profile.preferred_categories.iter().cloned().collect();
        let locations: Vec<String> = profile.preferred_locations.iter().cloned().collect();
        let liked_discoveries: Vec<i64> = profile.liked_discovery_ids.iter().copied().collect();
        let liked_recommendations: Vec<i64> =
            profile.liked_recommendation_ids.iter().copied().collect();

        sqlx::query(
            "INSERT INTO user_preferences (user_id, preferred_categories, preferred_locations, \
                 preferred_budget, min_rating, preferred_time_of_day, instagrammable, trending, \
                 exclusive, liked_discovery_ids, liked_recommendation_ids) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 preferred_categories = EXCLUDED.preferred_categories, \
                 preferred_locations = EXCLUDED.preferred_locations, \
                 preferred_budget = EXCLUDED.preferred_budget, \
                 min_rating = EXCLUDED.min_rating, \
                 preferred_time_of_day = EXCLUDED.preferred_time_of_day, \
                 instagrammable = EXCLUDED.instagrammable, \
                 trending = EXCLUDED.trending, \
                 exclusive = EXCLUDED.exclusive, \
                 liked_discovery_ids = EXCLUDED.liked_discovery_ids, \
                 liked_recommendation_ids = EXCLUDED.liked_recommendation_ids, \
                 updated_at = now()",
        )
        .bind(profile.user_id)
        .bind(&categories)
        .bind(&locations)
        .bind(profile.preferred_budget.map(|tier| tier.as_str()))
        .bind(profile.min_rating)
        .bind(profile.preferred_time_of_day.map(|tod| tod.as_str()))
        .bind(profile.instagrammable)
        .bind(profile.trending)
        .bind(profile.exclusive)
        .bind(&liked_discoveries)
        .bind(&liked_recommendations)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
